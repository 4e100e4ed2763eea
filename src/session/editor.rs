//! Line editor abstraction for the interactive loop.
//!
//! The loop only sees [`LineEditor`]; the terminal implementation wraps
//! rustyline and completes command names from the tree.

use std::rc::Rc;

use anyhow::{Result, anyhow};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::{
    Completer, Config, Context, Editor, Helper, Highlighter, Hinter, Validator,
};

use crate::cmd::CommandTree;
use crate::session::resolver::{bubble_lookup, descend};
use crate::tree::{NodeId, Tree};

/// Result of reading a line from the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    Line(String),
    /// Ctrl+C.
    Interrupted,
    /// Ctrl+D.
    Eof,
}

pub trait LineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    fn add_history(&mut self, line: &str);

    /// Tell the completer where the cursor is now.
    fn set_cursor(&mut self, _cursor: NodeId) {}
}

/// Completion candidates for `line` (the text before the caret).
///
/// The first word completes against every name visible by bubbling up from
/// `cursor`; later words complete children of the strictly resolved path.
pub fn candidates<P>(tree: &Tree<P>, cursor: NodeId, line: &str) -> Vec<String> {
    let line = line.trim_start();
    let parts: Vec<&str> = line.split_whitespace().collect();
    let (path, text) = if line.is_empty() || line.ends_with(char::is_whitespace) {
        (&parts[..], "")
    } else {
        match parts.split_last() {
            Some((last, path)) => (path, *last),
            None => (&parts[..], ""),
        }
    };

    let mut names: Vec<String> = match path.split_first() {
        None => tree
            .ancestors(cursor)
            .flat_map(|id| tree.node(id).children().iter().copied())
            .map(|id| tree.node(id).name().to_string())
            .filter(|name| name.starts_with(text))
            .collect(),
        Some((first, rest)) => {
            let Some(start) = bubble_lookup(tree, cursor, first) else {
                return Vec::new();
            };
            let (node, used) = descend(tree, start, rest);
            if used != rest.len() {
                return Vec::new();
            }
            tree.node(node)
                .children()
                .iter()
                .map(|id| tree.node(*id).name().to_string())
                .filter(|name| name.starts_with(text))
                .collect()
        }
    };
    names.sort();
    names.dedup();
    names
}

struct TreeCompleter {
    tree: Rc<CommandTree>,
    cursor: NodeId,
}

impl Completer for TreeCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let start = before
            .rfind(char::is_whitespace)
            .map_or(0, |i| i + 1);

        let pairs = candidates(&*self.tree, self.cursor, before)
            .into_iter()
            .map(|name| Pair {
                replacement: format!("{name} "),
                display: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

#[derive(Helper, Completer, Hinter, Highlighter, Validator)]
struct ShellHelper {
    #[rustyline(Completer)]
    completer: TreeCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

/// Terminal editor backed by rustyline.
pub struct RustylineEditor {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl RustylineEditor {
    pub fn new(tree: Rc<CommandTree>) -> Result<Self> {
        let config = Config::builder().auto_add_history(false).build();
        let cursor = tree.root();
        let helper = ShellHelper {
            completer: TreeCompleter { tree, cursor },
            hinter: HistoryHinter::new(),
        };

        let mut editor = Editor::with_config(config)
            .map_err(|e| anyhow!("failed to initialise line editor: {e}"))?;
        editor.set_helper(Some(helper));
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(anyhow!("failed to read input: {e}")),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_cursor(&mut self, cursor: NodeId) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.cursor = cursor;
        }
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Payload;

    fn sample() -> Tree<u8> {
        let mut tree = Tree::new();
        tree.insert(&["roll"], Payload::Raw(0)).unwrap();
        tree.insert(&["reload"], Payload::Raw(0)).unwrap();
        tree.insert(&["player", "show"], Payload::Raw(0)).unwrap();
        tree.insert(&["player", "stats", "str"], Payload::Raw(0))
            .unwrap();
        tree.insert(&["player", "roll"], Payload::Raw(0)).unwrap();
        tree
    }

    #[test]
    fn first_word_from_root() {
        let tree = sample();
        assert_eq!(candidates(&tree, tree.root(), "r"), ["reload", "roll"]);
        assert_eq!(
            candidates(&tree, tree.root(), ""),
            ["player", "reload", "roll"]
        );
    }

    #[test]
    fn first_word_bubbles_and_dedups() {
        let tree = sample();
        let player = tree.get(&["player"]).unwrap();
        assert_eq!(
            candidates(&tree, player, "r"),
            ["reload", "roll"],
            "player/roll shadows but appears once"
        );
        assert!(candidates(&tree, player, "s").contains(&"stats".to_string()));
    }

    #[test]
    fn later_words_descend_strictly() {
        let tree = sample();
        assert_eq!(candidates(&tree, tree.root(), "player s"), ["show", "stats"]);
        assert_eq!(candidates(&tree, tree.root(), "player stats "), ["str"]);
        assert!(candidates(&tree, tree.root(), "player nope ").is_empty());
        assert!(candidates(&tree, tree.root(), "stats ").is_empty());
    }

    #[test]
    fn leaf_has_no_children_to_offer() {
        let tree = sample();
        assert!(candidates(&tree, tree.root(), "roll ").is_empty());
    }
}
