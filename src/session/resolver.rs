/*!
Interactive resolution of one input line.

  1. split            shell-style tokenising
  2. bubbling lookup  first token, searched from the cursor up to the root
  3. strict descent   further tokens while each names a child of the match
  4. dispatch         navigate | enter-and-activate a Domain | invoke a Leaf

Every failure is a [`ShellError`]; the read-eval loop prints it as one line
and carries on.
*/

use std::io::Write;

use clap::error::ErrorKind;
use thiserror::Error;

use crate::cmd::{CommandContext, CommandTree, Flow};
use crate::log_trace;
use crate::session::Session;
use crate::tree::{NodeBody, NodeId, Tree};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Error: {0}")]
    Split(String),
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),
    #[error("Node '{0}' is not executable.")]
    NotExecutable(String),
    #[error("{0}")]
    ArgumentShape(String),
    #[error("Error: {0:#}")]
    Handler(anyhow::Error),
    #[error("Error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a token sequence ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A branch with nothing left over.
    Navigate(NodeId),
    /// A Domain followed by leftover tokens (one is the item to activate).
    Activate {
        domain: NodeId,
        item: String,
        extra: Vec<String>,
    },
    /// A Leaf and the tokens to parse as its arguments.
    Invoke { leaf: NodeId, args: Vec<String> },
}

/// Search for a child named `name`, starting at `start` and moving up.
pub fn bubble_lookup<P>(tree: &Tree<P>, start: NodeId, name: &str) -> Option<NodeId> {
    tree.ancestors(start).find_map(|id| tree.child(id, name))
}

/// Descend from `from` while the next token names a child. Returns the node
/// reached and how many tokens were consumed.
pub fn descend<P, S: AsRef<str>>(tree: &Tree<P>, from: NodeId, tokens: &[S]) -> (NodeId, usize) {
    let mut node = from;
    let mut used = 0;
    for token in tokens {
        match tree.child(node, token.as_ref()) {
            Some(child) => {
                node = child;
                used += 1;
            }
            None => break,
        }
    }
    (node, used)
}

pub fn resolve<P>(tree: &Tree<P>, cursor: NodeId, tokens: &[String]) -> Result<Resolution, ShellError> {
    let Some((first, rest)) = tokens.split_first() else {
        return Ok(Resolution::Navigate(cursor));
    };

    let start = bubble_lookup(tree, cursor, first)
        .ok_or_else(|| ShellError::CommandNotFound(first.clone()))?;
    let (node, used) = descend(tree, start, rest);
    let leftover = &rest[used..];
    log_trace!(
        "resolved '{first}' to '{}', leftover {leftover:?}",
        tree.path_of(node).join(" ")
    );

    match tree.node(node).body() {
        NodeBody::Leaf(_) => Ok(Resolution::Invoke {
            leaf: node,
            args: leftover.to_vec(),
        }),
        _ if leftover.is_empty() => Ok(Resolution::Navigate(node)),
        NodeBody::Domain(_) => Ok(Resolution::Activate {
            domain: node,
            item: leftover[0].clone(),
            extra: leftover[1..].to_vec(),
        }),
        NodeBody::Map(_) => Err(ShellError::CommandNotFound(leftover[0].clone())),
        NodeBody::Seq(_) => Err(ShellError::NotExecutable(tree.node(node).name().to_string())),
    }
}

/// Resolve and run one line against the session.
pub fn execute_line(
    tree: &CommandTree,
    session: &mut Session,
    line: &str,
    out: &mut dyn Write,
) -> Result<(), ShellError> {
    let tokens = shell_words::split(line).map_err(|e| ShellError::Split(e.to_string()))?;
    if tokens.is_empty() {
        return Ok(());
    }

    match resolve(tree, session.current, &tokens)? {
        Resolution::Navigate(id) => {
            session.current = id;
            Ok(())
        }
        Resolution::Activate {
            domain,
            item,
            extra,
        } => {
            session.current = domain;
            if let Some(unexpected) = extra.first() {
                return Err(ShellError::UnexpectedArgument(unexpected.clone()));
            }
            let node = tree.node(domain);
            let Some(handle) = node.domain() else {
                return Err(ShellError::NotExecutable(node.name().to_string()));
            };
            let found = handle
                .set_active(session, &item, out)
                .map_err(ShellError::Handler)?;
            if !found {
                writeln!(out, "'{item}' not found in {}.", node.name())?;
            }
            Ok(())
        }
        Resolution::Invoke { leaf, args } => invoke_leaf(tree, session, leaf, &args, out),
    }
}

fn invoke_leaf(
    tree: &CommandTree,
    session: &mut Session,
    leaf: NodeId,
    args: &[String],
    out: &mut dyn Write,
) -> Result<(), ShellError> {
    let node = tree.node(leaf);
    let Some(spec) = node.payload() else {
        return Err(ShellError::NotExecutable(node.name().to_string()));
    };

    let matches = match spec
        .to_command(node.name())
        .no_binary_name(true)
        .try_get_matches_from(args)
    {
        Ok(m) => m,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(out, "{}", e.render())?;
            return Ok(());
        }
        Err(e) => return Err(ShellError::ArgumentShape(summarize_clap_error(&e))),
    };

    let mut ctx = CommandContext {
        tree,
        session: &mut *session,
        matches: &matches,
        interactive: true,
        out,
    };
    if spec.invoke(&mut ctx).map_err(ShellError::Handler)? == Flow::Exit {
        session.should_exit = true;
    }
    Ok(())
}

/// Collapse a clap error to its first paragraph on one line.
pub fn summarize_clap_error(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered
        .split("\n\n")
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/* --------------------------------- Tests ---------------------------------- */
