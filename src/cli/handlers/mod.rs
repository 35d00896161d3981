// EN: src/cli/handlers/mod.rs

// Command handlers registered with the shell.

pub mod command;
pub mod generic_type;
pub mod navigation;
