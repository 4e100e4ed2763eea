/*!
Interactive state and the machinery that drives it.

  Session   - cursor into the command tree, exit flag, collaborators
  resolver  - bubbling lookup, strict descent, dispatch of one input line
  repl      - the read-eval loop over a `LineEditor`
  editor    - rustyline-backed editor with tree-aware tab completion

The command tree itself is not owned here: it is built once at startup and
shared read-only, so every operation takes `&CommandTree` alongside the
session.
*/

pub mod editor;
pub mod repl;
pub mod resolver;

use std::collections::BTreeMap;

use crate::characters::{Character, CharacterStore};
use crate::systems::GameSystem;
use crate::tree::NodeId;

pub struct Session {
    /// Cursor; starts at the root.
    pub current: NodeId,
    pub should_exit: bool,
    pub system: Box<dyn GameSystem>,
    pub store: CharacterStore,
    /// Loaded characters keyed by the name they were loaded under.
    pub players: BTreeMap<String, Character>,
    pub active_player: Option<String>,
    pub active_schema: Option<String>,
}

impl Session {
    pub fn with_store(root: NodeId, system: Box<dyn GameSystem>, store: CharacterStore) -> Self {
        Self {
            current: root,
            should_exit: false,
            system,
            store,
            players: BTreeMap::new(),
            active_player: None,
            active_schema: None,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current", &self.current)
            .field("should_exit", &self.should_exit)
            .field("system", &self.system.name())
            .field("players", &self.players.keys().collect::<Vec<_>>())
            .field("active_player", &self.active_player)
            .field("active_schema", &self.active_schema)
            .finish()
    }
}
