use std::io::Write;

use super::{CommandSpec, Flow};

pub fn command() -> CommandSpec {
    CommandSpec::new("Displays the application version.", |ctx| {
        writeln!(ctx.out, "gamagama v{}", env!("CARGO_PKG_VERSION"))?;
        Ok(Flow::Continue)
    })
}
