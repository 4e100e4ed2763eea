//! Read-eval loop.
//!
//! Reads a line, resolves it, prints any error as a single line and goes
//! again. Stops on a handler's exit signal, end-of-input or Ctrl+C.

use std::io::Write;

use anyhow::Result;

use crate::cmd::CommandTree;
use crate::log_debug;
use crate::session::Session;
use crate::session::editor::{LineEditor, ReadResult};
use crate::session::resolver::execute_line;
use crate::tree::NodeBody;

/// `gg> ` at the root, else `gg seg seg> `; a Domain with an active item
/// renders as `name (item)`.
pub fn prompt(tree: &CommandTree, session: &Session) -> String {
    let mut ids: Vec<_> = tree
        .ancestors(session.current)
        .filter(|id| *id != tree.root())
        .collect();
    ids.reverse();

    let mut prompt = String::from("gg");
    for id in ids {
        let node = tree.node(id);
        prompt.push(' ');
        prompt.push_str(node.name());
        if let NodeBody::Domain(d) = node.body()
            && let Some(active) = d.domain().get_active(session)
        {
            prompt.push_str(&format!(" ({active})"));
        }
    }
    prompt.push_str("> ");
    prompt
}

pub fn run<E: LineEditor>(
    tree: &CommandTree,
    session: &mut Session,
    editor: &mut E,
    out: &mut dyn Write,
) -> Result<()> {
    while !session.should_exit {
        editor.set_cursor(session.current);
        let line = match editor.read_line(&prompt(tree, session))? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted | ReadResult::Eof => {
                writeln!(out, "\nExiting.")?;
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        editor.add_history(&line);

        if let Err(e) = execute_line(tree, session, &line, out) {
            log_debug!("line failed: {e:?}");
            writeln!(out, "{e}")?;
        }
    }
    Ok(())
}

/* --------------------------------- Tests ---------------------------------- */
