/*!
Domain contract: a map branch that owns a vocabulary of item verbs.

Subsystems (active game system, active schema, loaded players) expose their
items through the same five verbs without sharing any implementation. Each
domain declares which verbs it supports; the global verb commands refuse the
rest before delegating.

State lives in the [`Session`], never in the domain itself, so domains are
plain values that can sit inside the (immutable) tree.
*/

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use anyhow::Result;

use crate::session::Session;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Show,
    List,
    Set,
    Load,
    Drop,
}

impl Verb {
    pub const fn variants() -> &'static [Verb] {
        &[Verb::Show, Verb::List, Verb::Set, Verb::Load, Verb::Drop]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Show => "show",
            Verb::List => "list",
            Verb::Set => "set",
            Verb::Load => "load",
            Verb::Drop => "drop",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Domain {
    fn supported_verbs(&self) -> &[Verb];

    fn supports(&self, verb: Verb) -> bool {
        self.supported_verbs().contains(&verb)
    }

    /// Names of the items available in this domain.
    fn list_items(&self, session: &Session) -> Vec<String>;

    fn get_active(&self, session: &Session) -> Option<String>;

    /// Make `name` the active item. `Ok(false)` means no such item.
    fn set_active(&self, session: &mut Session, name: &str, out: &mut dyn Write) -> Result<bool>;

    /// Details for `name`, or for the active item when `name` is `None`.
    fn show_item(&self, session: &Session, name: Option<&str>) -> Option<String>;

    fn has_nested_domains(&self) -> bool {
        false
    }

    /// Nested domain name -> its active item, for domains that have some.
    fn get_nested_actives(&self, _session: &Session) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn load_item(&self, _session: &mut Session, _name: &str, _out: &mut dyn Write) -> Result<bool> {
        Ok(false)
    }

    fn drop_item(
        &self,
        _session: &mut Session,
        _name: Option<&str>,
        _out: &mut dyn Write,
    ) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Fixed item list, active item kept inside the stub.
    pub(crate) struct StubDomain {
        verbs: Vec<Verb>,
        items: Vec<String>,
        active: RefCell<Option<String>>,
    }

    impl StubDomain {
        pub(crate) fn new(verbs: &[&str]) -> Self {
            Self {
                verbs: Verb::variants()
                    .iter()
                    .filter(|v| verbs.contains(&v.as_str()))
                    .copied()
                    .collect(),
                items: Vec::new(),
                active: RefCell::new(None),
            }
        }

        pub(crate) fn with_items(mut self, items: &[&str]) -> Self {
            self.items = items.iter().map(|s| s.to_string()).collect();
            self
        }
    }

    impl Domain for StubDomain {
        fn supported_verbs(&self) -> &[Verb] {
            &self.verbs
        }

        fn list_items(&self, _session: &Session) -> Vec<String> {
            self.items.clone()
        }

        fn get_active(&self, _session: &Session) -> Option<String> {
            self.active.borrow().clone()
        }

        fn set_active(&self, _session: &mut Session, name: &str, _out: &mut dyn Write) -> Result<bool> {
            if !self.items.iter().any(|i| i == name) {
                return Ok(false);
            }
            *self.active.borrow_mut() = Some(name.to_string());
            Ok(true)
        }

        fn show_item(&self, _session: &Session, name: Option<&str>) -> Option<String> {
            let target = name.map(str::to_string).or_else(|| self.active.borrow().clone())?;
            self.items
                .contains(&target)
                .then(|| format!("item: {target}"))
        }
    }

    #[test]
    fn verbs_render_lowercase() {
        let names: Vec<String> = Verb::variants().iter().map(Verb::to_string).collect();
        assert_eq!(names, ["show", "list", "set", "load", "drop"]);
    }

    #[test]
    fn supports_follows_declared_set() {
        let domain = StubDomain::new(&["show", "list", "set"]);
        assert!(domain.supports(Verb::List));
        assert!(!domain.supports(Verb::Load));
        assert!(!domain.has_nested_domains());
        assert_eq!(Verb::Load.to_string(), "load");
    }
}
