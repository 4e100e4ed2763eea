//! Die mechanics for the bundled systems.

use serde_json::json;

use super::{GameSystem, RandomSource};

/// Roll one die; with `explode`, keep rolling and adding while the max face comes up.
///
/// Explosion is ignored for one-sided dice, which would never stop.
pub fn roll_standard(rng: &mut dyn RandomSource, sides: u32, explode: bool) -> i64 {
    let explode = explode && sides > 1;
    let mut total = 0i64;
    loop {
        let roll = rng.between(1, sides);
        total += i64::from(roll);
        if !explode || roll != sides {
            return total;
        }
    }
}

/// Rolemaster open-ended percentile roll.
///
/// 96-100: roll again and add, repeating while the new roll is 96+.
/// 01-05 : roll again and subtract; the subtracted amount itself explodes up.
pub fn roll_open_ended(rng: &mut dyn RandomSource) -> i64 {
    let first = i64::from(rng.between(1, 100));

    if first >= 96 {
        let mut total = first;
        let mut last = first;
        while last >= 96 {
            last = i64::from(rng.between(1, 100));
            total += last;
        }
        total
    } else if first <= 5 {
        let mut subtract = 0i64;
        loop {
            let roll = i64::from(rng.between(1, 100));
            subtract += roll;
            if roll < 96 {
                break;
            }
        }
        first - subtract
    } else {
        first
    }
}

pub struct GenericSystem {
    rng: Box<dyn RandomSource>,
}

impl GenericSystem {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self { rng }
    }
}

impl GameSystem for GenericSystem {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn roll_die(&mut self, sides: u32, explode: bool) -> i64 {
        roll_standard(self.rng.as_mut(), sides, explode)
    }
}

pub struct RolemasterSystem {
    rng: Box<dyn RandomSource>,
}

impl RolemasterSystem {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self { rng }
    }
}

impl GameSystem for RolemasterSystem {
    fn name(&self) -> &'static str {
        "rolemaster"
    }

    fn roll_die(&mut self, sides: u32, explode: bool) -> i64 {
        if sides == 100 && explode {
            return roll_open_ended(self.rng.as_mut());
        }
        roll_standard(self.rng.as_mut(), sides, explode)
    }

    fn list_schemas(&self) -> Vec<String> {
        vec!["character".to_string()]
    }

    fn get_schema(&self, name: &str) -> Option<serde_json::Value> {
        match name {
            "character" => Some(json!({
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": {"type": "string"},
                    "system": {"type": "string", "const": "rolemaster"},
                    "stats": {
                        "type": "object",
                        "additionalProperties": {"type": "integer", "minimum": 1, "maximum": 102}
                    },
                    "skills": {"type": "object", "additionalProperties": {"type": "integer"}},
                    "counts": {
                        "type": "object",
                        "additionalProperties": {
                            "type": "array",
                            "items": {"type": "integer"},
                            "minItems": 2,
                            "maxItems": 2
                        }
                    }
                }
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::tests::Scripted;

    #[test]
    fn standard_without_explosion_is_single_roll() {
        let mut rng = Scripted::new(&[6, 6]);
        assert_eq!(roll_standard(&mut rng, 6, false), 6);
    }

    #[test]
    fn standard_explodes_on_max_face() {
        let mut rng = Scripted::new(&[6, 6, 2]);
        assert_eq!(roll_standard(&mut rng, 6, true), 14);
    }

    #[test]
    fn one_sided_die_never_explodes() {
        let mut rng = Scripted::always(1);
        assert_eq!(roll_standard(&mut rng, 1, true), 1);
    }

    #[test]
    fn open_ended_normal_range() {
        let mut rng = Scripted::new(&[50]);
        assert_eq!(roll_open_ended(&mut rng), 50);
    }

    #[test]
    fn open_ended_explodes_up_recursively() {
        let mut rng = Scripted::new(&[99, 98, 10]);
        assert_eq!(roll_open_ended(&mut rng), 207);
    }

    #[test]
    fn open_ended_explodes_down() {
        // 3 - (97 + 40)
        let mut rng = Scripted::new(&[3, 97, 40]);
        assert_eq!(roll_open_ended(&mut rng), -134);
    }

    #[test]
    fn rolemaster_uses_open_ended_only_for_exploding_percentile() {
        let mut sys = RolemasterSystem::new(Box::new(Scripted::new(&[96, 50])));
        assert_eq!(sys.roll_die(100, true), 146);

        let mut sys = RolemasterSystem::new(Box::new(Scripted::new(&[100, 3])));
        assert_eq!(sys.roll_die(100, false), 100);
    }

    #[test]
    fn rolemaster_exposes_character_schema() {
        let sys = RolemasterSystem::new(Box::new(Scripted::always(1)));
        assert_eq!(sys.list_schemas(), vec!["character"]);
        let schema = sys.get_schema("character").unwrap();
        assert_eq!(schema["required"][0], "name");
        assert!(sys.get_schema("spell").is_none());
    }

    #[test]
    fn generic_has_no_schemas() {
        let sys = GenericSystem::new(Box::new(Scripted::always(1)));
        assert!(sys.list_schemas().is_empty());
    }
}
