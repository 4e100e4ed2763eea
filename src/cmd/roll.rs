/*!
`roll` - dice expressions.

Syntax: `[count]d[sides][!][+-modifier]`, case-insensitive.
  3d6      three six-sided dice
  d20      one twenty-sided die
  3d6!     exploding: the maximum face rerolls and adds
  1d20+5   add a modifier
  d%       percentile (1-100)
  d%!      percentile with the active system's explosion rule
           (open-ended under rolemaster)

Each expression prints `<spec>: <total> [<die>, ...]`.
*/

use std::io::Write;

use super::{ArgSpec, Arity, CommandSpec, Flow};
use crate::systems::GameSystem;

const DESCRIPTION: &str = "\
Rolls dice based on one or more specifications.

Syntax: [count]d[sides][!][modifier]

Examples:
  3d6      - Roll 3 six-sided dice
  d20      - Roll 1 twenty-sided die
  3d6!     - Roll 3d6, rerolling max values (exploding)
  1d20+5   - Roll 1d20 and add 5
  2d8-2    - Roll 2d8 and subtract 2
  d%       - Roll a percentile die (1-100)
  d%!      - Open-ended percentile (rolemaster: up on 96-100, down on 1-5)";

pub fn command() -> CommandSpec {
    CommandSpec::new("Rolls dice based on one or more specifications.", |ctx| {
        for spec in ctx.values("dice_spec") {
            let line = roll(ctx.session.system.as_mut(), &spec);
            writeln!(ctx.out, "{line}")?;
        }
        Ok(Flow::Continue)
    })
    .description(DESCRIPTION)
    .arg(ArgSpec::new(
        "dice_spec",
        Arity::OneOrMore,
        "One or more dice specifications (e.g. '3d6', '1d20+5').",
    ))
}

/// Largest dice count accepted in one expression.
pub const MAX_DICE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    pub count: u32,
    pub sides: u32,
    pub explode: bool,
    pub modifier: i64,
}

/// Parse a dice expression; `None` when it does not match the syntax.
pub fn parse(spec: &str) -> Option<DiceSpec> {
    let lower = spec.to_ascii_lowercase();
    let (count, rest) = lower.split_once('d')?;

    let count = match count {
        "" => 1,
        digits if digits.bytes().all(|b| b.is_ascii_digit()) => digits.parse().ok()?,
        _ => return None,
    };
    if count > MAX_DICE {
        return None;
    }

    let sides_len = if rest.starts_with('%') {
        1
    } else {
        rest.bytes().take_while(u8::is_ascii_digit).count()
    };
    if sides_len == 0 {
        return None;
    }
    let (sides, rest) = rest.split_at(sides_len);
    let sides = if sides == "%" { 100 } else { sides.parse().ok()? };

    let (explode, rest) = match rest.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    let modifier = match rest.as_bytes().first() {
        None => 0,
        Some(b'+' | b'-') if rest.len() > 1 && rest[1..].bytes().all(|b| b.is_ascii_digit()) => {
            rest.parse().ok()?
        }
        _ => return None,
    };

    Some(DiceSpec {
        count,
        sides,
        explode,
        modifier,
    })
}

/// Roll one expression and render the result line (or its diagnostic).
pub fn roll(system: &mut dyn GameSystem, spec: &str) -> String {
    let Some(dice) = parse(spec) else {
        return format!("{spec}: Invalid dice specification.");
    };
    if dice.sides == 0 {
        return format!("{spec}: Cannot roll a 0-sided die.");
    }
    if dice.sides == 1 && dice.explode {
        return format!("{spec}: Cannot explode a 1-sided die (infinite loop).");
    }

    let rolls: Vec<i64> = (0..dice.count)
        .map(|_| system.roll_die(dice.sides, dice.explode))
        .collect();
    let total = rolls
        .iter()
        .try_fold(dice.modifier, |acc, r| acc.checked_add(*r));
    match total {
        Some(total) => format!("{spec}: {total} {rolls:?}"),
        None => format!("{spec}: Invalid dice specification."),
    }
}
