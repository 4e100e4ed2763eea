/*!
`help [path...]` and the two visitors behind it.

  DescriptionVisitor  one line per node: a leaf's help, or "<Name> subcommands"
  HelpPrinter         full help: an indented, sorted tree for branches, the
                      long description for leaves

Both are also used by the grammar builder for `about` texts.
*/

use std::io::Write;

use anyhow::Result;

use super::{ArgSpec, Arity, CommandSpec, CommandTree, Flow};
use crate::session::resolver::{bubble_lookup, descend};
use crate::tree::{NodeId, NodeVisitor, dispatch};

pub fn command() -> CommandSpec {
    CommandSpec::new("Shows help for a specific command.", |ctx| {
        let path = ctx.values("command_name");
        let target = match path.split_first() {
            None => Some(ctx.session.current),
            Some((first, rest)) => bubble_lookup(ctx.tree, ctx.session.current, first)
                .map(|start| descend(ctx.tree, start, rest))
                .filter(|(_, used)| *used == rest.len())
                .map(|(id, _)| id),
        };

        match target {
            Some(id) => print_help(ctx.tree, id, ctx.out)?,
            None => writeln!(ctx.out, "Unknown command: '{}'", path.join(" "))?,
        }
        Ok(Flow::Continue)
    })
    .arg(ArgSpec::new(
        "command_name",
        Arity::ZeroOrMore,
        "The command path to get help for.",
    ))
}

pub fn print_help(tree: &CommandTree, id: NodeId, out: &mut dyn Write) -> Result<()> {
    dispatch(tree, id, &mut HelpPrinter { out })
}

/// One-line summary of a node.
pub fn describe(tree: &CommandTree, id: NodeId) -> String {
    dispatch(tree, id, &mut DescriptionVisitor)
}

pub struct DescriptionVisitor;

impl NodeVisitor<CommandSpec> for DescriptionVisitor {
    type Output = String;

    fn visit_map_branch(&mut self, tree: &CommandTree, id: NodeId) -> String {
        format!("{} subcommands", capitalize(tree.node(id).name()))
    }

    fn visit_leaf(&mut self, _tree: &CommandTree, _id: NodeId, spec: &CommandSpec) -> String {
        spec.help.clone()
    }

    fn generic_visit(&mut self, _tree: &CommandTree, _id: NodeId) -> String {
        String::new()
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub struct HelpPrinter<'w> {
    out: &'w mut dyn Write,
}

impl HelpPrinter<'_> {
    fn print_tree(&mut self, tree: &CommandTree, branch: NodeId, indent: usize) -> Result<()> {
        let mut children: Vec<NodeId> = tree.node(branch).children().to_vec();
        if children.is_empty() {
            return Ok(());
        }
        children.sort_by(|a, b| tree.node(*a).name().cmp(tree.node(*b).name()));
        let width = children
            .iter()
            .map(|c| tree.node(*c).name().len())
            .max()
            .unwrap_or(0)
            + 2;

        for child in children {
            let node = tree.node(child);
            writeln!(
                self.out,
                "{:indent$}{:<width$}{}",
                "",
                node.name(),
                describe(tree, child)
            )?;
            if node.as_map().is_some() {
                self.print_tree(tree, child, indent + 2)?;
            }
        }
        Ok(())
    }
}

impl NodeVisitor<CommandSpec> for HelpPrinter<'_> {
    type Output = Result<()>;

    fn visit_map_branch(&mut self, tree: &CommandTree, id: NodeId) -> Result<()> {
        if id == tree.root() {
            writeln!(self.out, "Available commands:")?;
        } else {
            writeln!(self.out, "Available commands in '{}':", tree.node(id).name())?;
        }
        self.print_tree(tree, id, 2)
    }

    fn visit_leaf(&mut self, tree: &CommandTree, id: NodeId, spec: &CommandSpec) -> Result<()> {
        writeln!(self.out, "Help for '{}':", tree.path_of(id).join(" "))?;
        for line in spec.long_help().trim().lines() {
            writeln!(self.out, "  {line}")?;
        }
        Ok(())
    }

    fn generic_visit(&mut self, tree: &CommandTree, id: NodeId) -> Result<()> {
        writeln!(
            self.out,
            "Node '{}' is not a command or group.",
            tree.path_of(id).join(" ")
        )?;
        Ok(())
    }
}

/* --------------------------------- Tests ---------------------------------- */
