use super::{CommandSpec, Flow};

pub fn command() -> CommandSpec {
    CommandSpec::new("Exits the interactive session.", |_| Ok(Flow::Exit))
}
