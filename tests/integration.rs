#[path = "integration/cli.rs"]
mod cli;
#[path = "integration/session.rs"]
mod session;
