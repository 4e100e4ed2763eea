/*!
Static grammar for single-shot mode.

The tree is compiled into a nested `clap::Command`: map branches and domains
become subcommand groups, leaves become commands carrying their argument
shapes. Compilation walks the tree in pre-order keeping one compiled command
per visited node, then folds children into their parents bottom-up so each
group lists its subcommands in insertion order.

Parsing the process arguments yields the matched node:
  leaf   -> run its handler once with a transient session
  group  -> print the group's help
  error  -> clap prints usage and the process exits
*/

use std::collections::HashMap;
use std::io::Write;

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgMatches, Command};

use crate::cmd::help::describe;
use crate::cmd::{CommandContext, CommandSpec, CommandTree, Flow};
use crate::log_debug;
use crate::session::Session;
use crate::systems::system_names;
use crate::tree::{NodeId, NodeVisitor, dispatch};

pub const BIN_NAME: &str = "gg";

/// Per-kind compilation of a single node (children are attached later).
struct Compiler;

impl NodeVisitor<CommandSpec> for Compiler {
    type Output = Option<Command>;

    fn visit_map_branch(&mut self, tree: &CommandTree, id: NodeId) -> Option<Command> {
        if id == tree.root() {
            return Some(root_command());
        }
        let name = tree.node(id).name().to_string();
        Some(
            Command::new(name)
                .about(describe(tree, id))
                .disable_help_subcommand(true),
        )
    }

    fn visit_leaf(&mut self, tree: &CommandTree, id: NodeId, spec: &CommandSpec) -> Option<Command> {
        Some(spec.to_command(tree.node(id).name()))
    }

    fn generic_visit(&mut self, _tree: &CommandTree, _id: NodeId) -> Option<Command> {
        None
    }
}

fn root_command() -> Command {
    Command::new(BIN_NAME)
        .about("A Game Master Game Manager for tabletop RPGs.")
        .version(env!("CARGO_PKG_VERSION"))
        .disable_help_subcommand(true)
        .arg(
            Arg::new("system")
                .long("system")
                .value_name("NAME")
                .help("The game system to use.")
                .value_parser(PossibleValuesParser::new(system_names())),
        )
}

pub struct Grammar {
    command: Command,
}

impl Grammar {
    pub fn build(tree: &CommandTree) -> Self {
        let order: Vec<NodeId> = tree.walk().collect();
        let mut compiled: HashMap<NodeId, Command> = order
            .iter()
            .filter_map(|id| dispatch(tree, *id, &mut Compiler).map(|cmd| (*id, cmd)))
            .collect();

        // Reverse pre-order: every node is finished before its parent is.
        for id in order.iter().rev() {
            let children: Vec<Command> = tree
                .node(*id)
                .children()
                .iter()
                .filter_map(|child| compiled.remove(child))
                .collect();
            if children.is_empty() {
                continue;
            }
            if let Some(cmd) = compiled.remove(id) {
                compiled.insert(*id, cmd.subcommands(children));
            }
        }

        let command = compiled.remove(&tree.root()).unwrap_or_else(root_command);
        log_debug!("compiled grammar with {} top-level commands", command.get_subcommands().count());
        Self { command }
    }

    /// Parse `args` (binary name first) and map the subcommand chain to a node.
    pub fn parse<I, T>(&mut self, tree: &CommandTree, args: I) -> Result<(NodeId, ArgMatches), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = self.command.try_get_matches_from_mut(args)?;

        let mut path: Vec<String> = Vec::new();
        let mut current = &matches;
        while let Some((name, sub)) = current.subcommand() {
            path.push(name.to_string());
            current = sub;
        }
        let leaf_matches = current.clone();
        let id = tree.get(&path).unwrap_or(tree.root());
        Ok((id, leaf_matches))
    }

    /// Help text for the group at `id`.
    pub fn render_help(&self, tree: &CommandTree, id: NodeId) -> String {
        let mut cmd = &self.command;
        for segment in tree.path_of(id) {
            match cmd.find_subcommand(segment) {
                Some(sub) => cmd = sub,
                None => break,
            }
        }
        cmd.clone().render_help().to_string()
    }

    /// Parse and run once. Parse failures print usage and exit the process.
    pub fn run(
        &mut self,
        tree: &CommandTree,
        session: &mut Session,
        args: Vec<String>,
        out: &mut dyn Write,
    ) -> Result<Flow> {
        let (id, matches) = match self.parse(tree, args) {
            Ok(parsed) => parsed,
            Err(e) => e.exit(),
        };

        let node = tree.node(id);
        let Some(spec) = node.payload() else {
            write!(out, "{}", self.render_help(tree, id))?;
            return Ok(Flow::Continue);
        };

        let mut ctx = CommandContext {
            tree,
            session,
            matches: &matches,
            interactive: false,
            out,
        };
        spec.invoke(&mut ctx)
            .with_context(|| format!("'{}' failed", tree.path_of(id).join(" ")))
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::build_tree;
    use crate::session::tests::pinned_session;

    fn argv(words: &[&str]) -> Vec<String> {
        std::iter::once(BIN_NAME)
            .chain(words.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn groups_and_leaves_become_subcommands() {
        let tree = build_tree().unwrap();
        let grammar = Grammar::build(&tree);
        let root = &grammar.command;

        let top: Vec<&str> = root.get_subcommands().map(|c| c.get_name()).collect();
        assert_eq!(
            top,
            [
                "help", "quit", "version", "..", "/", "roll", "show", "list", "set", "load",
                "drop", "system", "player"
            ]
        );

        let system = root.find_subcommand("system").unwrap();
        let nested: Vec<&str> = system.get_subcommands().map(|c| c.get_name()).collect();
        assert_eq!(nested, ["show", "schema"]);
        assert_eq!(
            system.get_about().map(|s| s.to_string()).as_deref(),
            Some("System subcommands")
        );
    }

    #[test]
    fn parse_maps_leaf_and_arguments() {
        let tree = build_tree().unwrap();
        let mut grammar = Grammar::build(&tree);

        let (id, matches) = grammar.parse(&tree, argv(&["roll", "1d6", "2d8"])).unwrap();
        assert_eq!(id, tree.get(&["roll"]).unwrap());
        let specs: Vec<&String> = matches.get_many::<String>("dice_spec").unwrap().collect();
        assert_eq!(specs, ["1d6", "2d8"]);

        let (id, _) = grammar.parse(&tree, argv(&["system", "show"])).unwrap();
        assert_eq!(id, tree.get(&["system", "show"]).unwrap());
    }

    #[test]
    fn parse_group_without_leaf() {
        let tree = build_tree().unwrap();
        let mut grammar = Grammar::build(&tree);
        let (id, _) = grammar.parse(&tree, argv(&["system"])).unwrap();
        assert_eq!(id, tree.get(&["system"]).unwrap());
        let (id, _) = grammar.parse(&tree, argv(&[])).unwrap();
        assert_eq!(id, tree.root());
    }

    #[test]
    fn parse_failures_are_clap_errors() {
        let tree = build_tree().unwrap();
        let mut grammar = Grammar::build(&tree);
        let err = grammar.parse(&tree, argv(&["nope"])).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);

        let err = grammar.parse(&tree, argv(&["roll"])).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let err = grammar
            .parse(&tree, argv(&["--system", "gurps", "version"]))
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn run_leaf_once() {
        let tree = build_tree().unwrap();
        let mut grammar = Grammar::build(&tree);
        let mut session = pinned_session(tree.root(), 1);
        let mut out = Vec::new();
        let flow = grammar
            .run(&tree, &mut session, argv(&["roll", "1d1"]), &mut out)
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(String::from_utf8(out).unwrap(), "1d1: 1 [1]\n");
    }

    #[test]
    fn run_group_prints_its_help() {
        let tree = build_tree().unwrap();
        let mut grammar = Grammar::build(&tree);
        let mut session = pinned_session(tree.root(), 1);
        let mut out = Vec::new();
        grammar
            .run(&tree, &mut session, argv(&["system"]), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("System subcommands"), "{text}");
        assert!(text.contains("schema"));
    }

    #[test]
    fn run_navigation_reports_single_shot() {
        let tree = build_tree().unwrap();
        let mut grammar = Grammar::build(&tree);
        let mut session = pinned_session(tree.root(), 1);
        let mut out = Vec::new();
        grammar.run(&tree, &mut session, argv(&[".."]), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error: Navigation commands only work in interactive mode.\n"
        );
    }
}
