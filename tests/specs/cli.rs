#[path = "cli/help.rs"]
mod help;
