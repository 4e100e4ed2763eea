//! Cursor movement: `..` (parent) and `/` (root).

use std::io::Write;

use super::{CommandContext, CommandSpec, Flow};

const INTERACTIVE_ONLY: &str = "Error: Navigation commands only work in interactive mode.";

pub fn up() -> CommandSpec {
    CommandSpec::new("Moves the interactive session up one level.", |ctx| {
        if refuse_outside_loop(ctx)? {
            return Ok(Flow::Continue);
        }
        if let Some(parent) = ctx.tree.node(ctx.session.current).parent() {
            ctx.session.current = parent;
        }
        Ok(Flow::Continue)
    })
}

pub fn root() -> CommandSpec {
    CommandSpec::new("Moves the interactive session to the root.", |ctx| {
        if refuse_outside_loop(ctx)? {
            return Ok(Flow::Continue);
        }
        ctx.session.current = ctx.tree.root();
        Ok(Flow::Continue)
    })
}

fn refuse_outside_loop(ctx: &mut CommandContext<'_>) -> anyhow::Result<bool> {
    if ctx.interactive {
        return Ok(false);
    }
    writeln!(ctx.out, "{INTERACTIVE_ONLY}")?;
    Ok(true)
}
