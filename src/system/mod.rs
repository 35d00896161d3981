//! # System Interaction Layer
//!
//! The boundary between the shell logic and the outside world.
//!
//! ## Modules
//!
//! - **`controller`**: the transport seam to a management controller.
//! - **`local_model`**: an in-process controller serving a JSON model document.
//! - **`console`**: output sinks and column formatting.
//! - **`config`**: loading of `config.toml`.
//! - **`shell`**: the interactive session and its input loop.

pub mod config;
pub mod console;
pub mod controller;
pub mod local_model;
pub mod shell;
