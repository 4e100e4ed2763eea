/*!
Command units and the registration table.

Every command is a Leaf carrying a [`CommandSpec`]; every subsystem with items
(system, schema, player) is a Domain. [`build_tree`] is the single place where
units are registered, in the order they should appear.

Layout:
  src/cmd/
    mod.rs         (this file: registration table)
    spec.rs        (CommandSpec / ArgSpec / CommandContext / Flow)
    help.rs        (help + description/printer visitors)
    navigation.rs  (.. and /)
    quit.rs
    version.rs
    roll.rs        (dice expressions)
    verbs.rs       (show / list / set / load / drop)
    system.rs      (system + schema domains)
    player.rs      (player domain)

Conventions:
  - Each unit exposes one `pub fn` returning what gets registered
    (a `CommandSpec` or a `Detached` subtree).
  - Handlers write to `ctx.out`, never straight to stdout.
  - Expected user mistakes are printed as one line and return
    `Ok(Flow::Continue)`; `Err` is kept for real failures.
*/

pub mod help;
pub mod navigation;
pub mod player;
pub mod quit;
pub mod roll;
pub mod spec;
pub mod system;
pub mod verbs;
pub mod version;

pub use spec::{ArgSpec, Arity, CommandContext, CommandSpec, CommandTree, Flow};

use crate::domain::Verb;
use crate::tree::{Payload, TreeError};

/// Register every command and domain.
pub fn build_tree() -> Result<CommandTree, TreeError> {
    let mut tree = CommandTree::new();

    tree.insert(&["help"], Payload::Raw(help::command()))?;
    tree.insert(&["quit"], Payload::Raw(quit::command()))?;
    tree.insert(&["version"], Payload::Raw(version::command()))?;
    tree.insert(&[".."], Payload::Raw(navigation::up()))?;
    tree.insert(&["/"], Payload::Raw(navigation::root()))?;
    tree.insert(&["roll"], Payload::Raw(roll::command()))?;

    for verb in Verb::variants() {
        tree.insert(&[verb.as_str()], Payload::Raw(verbs::command(*verb)))?;
    }

    tree.insert(&["system"], system::domain().into())?;
    tree.insert(&["player"], player::domain().into())?;

    Ok(tree)
}
