/*!
Leaf payload: what a command declares and how it runs.

A [`CommandSpec`] carries a one-line help, an optional long description, the
positional argument shapes and a handler. The same shapes compile into the
static grammar (single-shot mode) and into the throwaway parser used for the
leftover tokens of an interactive line.
*/

use std::io::Write;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};

use crate::session::Session;
use crate::tree::Tree;

pub type CommandTree = Tree<CommandSpec>;

/// Handler outcome.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop the interactive loop.
    Exit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    Required,
    Optional,
    OneOrMore,
    ZeroOrMore,
}

/// One positional argument shape.
#[derive(Clone, Debug)]
pub struct ArgSpec {
    pub name: &'static str,
    pub help: &'static str,
    pub arity: Arity,
}

impl ArgSpec {
    pub fn new(name: &'static str, arity: Arity, help: &'static str) -> Self {
        Self {
            name,
            help,
            arity,
        }
    }

    pub fn to_arg(&self) -> Arg {
        let arg = Arg::new(self.name).help(self.help).value_name(self.name);
        match self.arity {
            Arity::Required => arg.required(true).action(ArgAction::Set),
            Arity::Optional => arg.required(false).action(ArgAction::Set),
            Arity::OneOrMore => arg.required(true).num_args(1..).action(ArgAction::Append),
            Arity::ZeroOrMore => arg.required(false).num_args(0..).action(ArgAction::Append),
        }
    }
}

pub type Handler = Box<dyn Fn(&mut CommandContext<'_>) -> Result<Flow>>;

pub struct CommandSpec {
    pub help: String,
    pub description: Option<String>,
    pub arguments: Vec<ArgSpec>,
    handler: Handler,
}

impl CommandSpec {
    pub fn new<F>(help: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>) -> Result<Flow> + 'static,
    {
        Self {
            help: help.into(),
            description: None,
            arguments: Vec::new(),
            handler: Box::new(handler),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.arguments.push(arg);
        self
    }

    /// Long description if set, else the one-line help.
    pub fn long_help(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.help)
    }

    /// Compile into a clap command named `name`.
    pub fn to_command(&self, name: &str) -> Command {
        let mut cmd = Command::new(name.to_string())
            .about(self.help.clone())
            .disable_help_subcommand(true)
            .color(ColorChoice::Never);
        if let Some(desc) = &self.description {
            cmd = cmd.long_about(desc.trim().to_string());
        }
        cmd.args(self.arguments.iter().map(ArgSpec::to_arg))
    }

    pub fn invoke(&self, ctx: &mut CommandContext<'_>) -> Result<Flow> {
        (self.handler)(ctx)
    }
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("help", &self.help)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Everything a handler may touch while it runs.
pub struct CommandContext<'a> {
    pub tree: &'a CommandTree,
    pub session: &'a mut Session,
    pub matches: &'a ArgMatches,
    pub interactive: bool,
    pub out: &'a mut dyn Write,
}

impl CommandContext<'_> {
    pub fn value(&self, name: &str) -> Option<&str> {
        self.matches.get_one::<String>(name).map(String::as_str)
    }

    pub fn values(&self, name: &str) -> Vec<String> {
        self.matches
            .get_many::<String>(name)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default()
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommandSpec {
        CommandSpec::new("Rolls dice.", |_| Ok(Flow::Continue))
            .arg(ArgSpec::new("mode", Arity::Required, "mode"))
            .arg(ArgSpec::new("specs", Arity::ZeroOrMore, "dice"))
    }

    #[test]
    fn compiles_required_and_repeated_positionals() {
        let matches = sample()
            .to_command("roll")
            .no_binary_name(true)
            .try_get_matches_from(["fast", "1d6", "2d8"])
            .unwrap();
        assert_eq!(matches.get_one::<String>("mode").unwrap(), "fast");
        let specs: Vec<&String> = matches.get_many::<String>("specs").unwrap().collect();
        assert_eq!(specs, ["1d6", "2d8"]);
    }

    #[test]
    fn help_flag_is_not_a_value() {
        let err = sample()
            .to_command("roll")
            .no_binary_name(true)
            .try_get_matches_from(["--help"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn missing_required_is_an_error() {
        let err = sample()
            .to_command("roll")
            .no_binary_name(true)
            .try_get_matches_from(Vec::<String>::new())
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn one_or_more_needs_a_value() {
        let spec = CommandSpec::new("x", |_| Ok(Flow::Continue))
            .arg(ArgSpec::new("items", Arity::OneOrMore, "items"));
        assert!(
            spec.to_command("x")
                .no_binary_name(true)
                .try_get_matches_from(Vec::<String>::new())
                .is_err()
        );
    }

    #[test]
    fn long_help_prefers_description() {
        let spec = CommandSpec::new("short", |_| Ok(Flow::Continue));
        assert_eq!(spec.long_help(), "short");
        let spec = spec.description("long text");
        assert_eq!(spec.long_help(), "long text");
    }
}
