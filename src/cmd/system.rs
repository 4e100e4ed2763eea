/*!
`system` domain (active game system) with its nested `schema` domain.

  system          show | list | set     items: registered systems
    show          leaf: "Current system: <name>"
    schema        show | list | set     items: the active system's schemas

Changing the system clears the active schema, since schema names belong to a
system.
*/

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;

use super::{CommandSpec, Flow};
use crate::domain::{Domain, Verb};
use crate::session::Session;
use crate::systems::{create_system, system_names};
use crate::tree::Detached;

const VERBS: &[Verb] = &[Verb::Show, Verb::List, Verb::Set];

pub fn domain() -> Detached<CommandSpec> {
    Detached::domain("system", SystemDomain)
        .with_child(Detached::leaf("show", show_command()))
        .with_child(Detached::domain("schema", SchemaDomain))
}

fn show_command() -> CommandSpec {
    CommandSpec::new("Shows the active game system.", |ctx| {
        writeln!(ctx.out, "Current system: {}", ctx.session.system.name())?;
        Ok(Flow::Continue)
    })
}

pub struct SystemDomain;

impl Domain for SystemDomain {
    fn supported_verbs(&self) -> &[Verb] {
        VERBS
    }

    fn list_items(&self, _session: &Session) -> Vec<String> {
        system_names().into_iter().map(str::to_string).collect()
    }

    fn get_active(&self, session: &Session) -> Option<String> {
        Some(session.system.name().to_string())
    }

    fn set_active(&self, session: &mut Session, name: &str, out: &mut dyn Write) -> Result<bool> {
        let Some(system) = create_system(name) else {
            writeln!(out, "Error: System '{name}' not found.")?;
            return Ok(false);
        };
        session.system = system;
        session.active_schema = None;
        writeln!(out, "System changed to: {}", session.system.name())?;
        Ok(true)
    }

    fn show_item(&self, session: &Session, name: Option<&str>) -> Option<String> {
        let target = name.unwrap_or(session.system.name());
        system_names()
            .iter()
            .any(|known| *known == target)
            .then(|| format!("System: {target}"))
    }

    fn has_nested_domains(&self) -> bool {
        true
    }

    fn get_nested_actives(&self, session: &Session) -> BTreeMap<String, String> {
        session
            .active_schema
            .iter()
            .map(|schema| ("schema".to_string(), schema.clone()))
            .collect()
    }
}

pub struct SchemaDomain;

impl Domain for SchemaDomain {
    fn supported_verbs(&self) -> &[Verb] {
        VERBS
    }

    fn list_items(&self, session: &Session) -> Vec<String> {
        session.system.list_schemas()
    }

    fn get_active(&self, session: &Session) -> Option<String> {
        session.active_schema.clone()
    }

    fn set_active(&self, session: &mut Session, name: &str, out: &mut dyn Write) -> Result<bool> {
        if !session.system.list_schemas().iter().any(|s| s == name) {
            writeln!(
                out,
                "Error: Schema '{name}' not found in system '{}'.",
                session.system.name()
            )?;
            return Ok(false);
        }
        session.active_schema = Some(name.to_string());
        Ok(true)
    }

    fn show_item(&self, session: &Session, name: Option<&str>) -> Option<String> {
        let target = name.or(session.active_schema.as_deref())?;
        let schema = session.system.get_schema(target)?;
        serde_json::to_string_pretty(&schema).ok()
    }
}

/* --------------------------------- Tests ---------------------------------- */
