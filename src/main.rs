use std::io::{self, Write};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::PossibleValuesParser;

mod characters;
mod cmd;
mod config;
mod domain;
mod grammar;
mod session;
mod systems;
mod tree;
mod utils;

use characters::CharacterStore;
use grammar::Grammar;
use session::Session;
use session::editor::RustylineEditor;
use utils::output::{Color, color};

/// gamagama - a Game Master tool for tabletop RPGs.
///
/// One command tree, two ways in:
///   gg                       interactive shell with a navigable cursor
///   gg <command> [args...]   run one command and exit
///
/// Interactive shell:
///   roll 3d6!+2              commands are found from the cursor upwards
///   system                   enter a group (prompt shows the path)
///   system rolemaster        enter a domain and make an item active
///   ..  /                    up one level / back to the root
///   help [path...]           command tree or a command's description
///
/// Global flags:
///   -v / -vv        Increase verbosity
///   -q / --quiet    Errors only
///   --system NAME   Game system (overrides the config file)
///
/// Config (first found): ~/.config/gg-cli/config.yaml, ~/.gg-cli.yaml
#[derive(Parser, Debug)]
#[command(
    name = "gg",
    about = "A Game Master Game Manager for tabletop RPGs.",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long)]
    quiet: bool,

    /// The game system to use
    #[arg(long, value_name = "NAME", value_parser = PossibleValuesParser::new(systems::system_names()))]
    system: Option<String>,

    /// Command path and arguments; omit for the interactive shell
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let mut config = config::load_config();
    config.validate(&systems::system_names());

    // CLI flag > config > default
    let system_name = cli
        .system
        .clone()
        .or_else(|| config.core.system.clone())
        .unwrap_or_else(|| systems::DEFAULT_SYSTEM.to_string());
    let system = systems::create_system(&system_name).with_context(|| {
        format!(
            "System '{system_name}' not found. Available: {}",
            systems::system_names().join(", ")
        )
    })?;
    log_info!("using system '{system_name}'");

    let tree = cmd::build_tree().context("failed to register commands")?;
    log_debug!("registered {} nodes", tree.len());

    let store = config
        .characters
        .dir
        .clone()
        .map(CharacterStore::new)
        .unwrap_or_default();
    log_debug!("character store at {}", store.base_dir().display());
    let mut session = Session::with_store(tree.root(), system, store);

    if cli.command.is_empty() {
        run_interactive(Rc::new(tree), &mut session)
    } else {
        run_single_shot(&tree, &mut session, cli.command)
    }
}

fn run_single_shot(tree: &cmd::CommandTree, session: &mut Session, tokens: Vec<String>) -> Result<()> {
    let mut grammar = Grammar::build(tree);
    let args = std::iter::once(grammar::BIN_NAME.to_string())
        .chain(tokens)
        .collect();
    let mut stdout = io::stdout();
    grammar.run(tree, session, args, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

fn run_interactive(tree: Rc<cmd::CommandTree>, session: &mut Session) -> Result<()> {
    let mut editor = RustylineEditor::new(Rc::clone(&tree))?;
    let mut stdout = io::stdout();

    let banner = format!("Welcome to gamagama! (System: {})", session.system.name());
    writeln!(stdout, "{}", color(Color::Bold, banner))?;
    writeln!(stdout, "Type 'quit' to exit.")?;

    session::repl::run(&tree, session, &mut editor, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}
