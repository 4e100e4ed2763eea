//! `player` domain: characters loaded into the session from the store.
//!
//! Supports every verb. Items are keyed by the name they were loaded under,
//! which is also the store lookup key.

use std::io::Write;

use anyhow::Result;

use super::CommandSpec;
use crate::domain::{Domain, Verb};
use crate::log_debug;
use crate::session::Session;
use crate::tree::Detached;

pub fn domain() -> Detached<CommandSpec> {
    Detached::domain("player", PlayerDomain)
}

pub struct PlayerDomain;

impl Domain for PlayerDomain {
    fn supported_verbs(&self) -> &[Verb] {
        Verb::variants()
    }

    fn list_items(&self, session: &Session) -> Vec<String> {
        session.players.keys().cloned().collect()
    }

    fn get_active(&self, session: &Session) -> Option<String> {
        session.active_player.clone()
    }

    fn set_active(&self, session: &mut Session, name: &str, _out: &mut dyn Write) -> Result<bool> {
        if !session.players.contains_key(name) {
            return Ok(false);
        }
        session.active_player = Some(name.to_string());
        Ok(true)
    }

    fn show_item(&self, session: &Session, name: Option<&str>) -> Option<String> {
        let target = name.or(session.active_player.as_deref())?;
        session.players.get(target).map(|c| c.describe())
    }

    fn load_item(&self, session: &mut Session, name: &str, out: &mut dyn Write) -> Result<bool> {
        if session.players.contains_key(name) {
            writeln!(out, "Character '{name}' is already loaded.")?;
            return Ok(false);
        }
        match session.store.load(name) {
            Ok(character) => {
                writeln!(out, "Loaded character: {}", character.name)?;
                session.players.insert(name.to_string(), character);
                Ok(true)
            }
            Err(e) => {
                log_debug!("load '{name}' from {}: {e:?}", session.store.base_dir().display());
                writeln!(out, "{e}")?;
                Ok(false)
            }
        }
    }

    fn drop_item(&self, session: &mut Session, name: Option<&str>, out: &mut dyn Write) -> Result<bool> {
        let Some(target) = name.map(str::to_string).or_else(|| session.active_player.clone()) else {
            writeln!(out, "No player specified and no active player set.")?;
            return Ok(false);
        };
        if session.players.remove(&target).is_none() {
            writeln!(out, "Character '{target}' is not loaded.")?;
            return Ok(false);
        }
        writeln!(out, "Dropped character: {target}")?;
        if session.active_player.as_deref() == Some(target.as_str()) {
            session.active_player = None;
            writeln!(out, "Active player cleared.")?;
        }
        Ok(true)
    }
}
