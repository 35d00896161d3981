//! modelsh: an interactive administration shell for hierarchical management models.
//!
//! The shell's command surface can be extended at runtime with the `command` built-in,
//! which binds new command names to generic handlers over a type in the model tree.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
