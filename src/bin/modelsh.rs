// EN: src/bin/modelsh.rs

use anyhow::Result;
use clap::Parser;
use modelsh::{
    cli::Cli,
    system::{
        config,
        console::StdoutSink,
        local_model::LocalModelController,
        shell::{self, Shell},
    },
    t,
};
use std::{
    io::{self, IsTerminal},
    sync::Arc,
};

/// The main entry point of `modelsh`.
/// It sets up logging, parses arguments, runs the requested mode and reports failures.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        shell::print_error(&e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    // Command-line flags win over the config file.
    let config = config::load_config(cli.config.as_deref())?;
    let model_path = match cli.model {
        Some(path) => Some(path),
        None => config.expanded_model_path()?,
    };
    let columns = cli
        .columns
        .filter(|c| *c > 0)
        .unwrap_or_else(|| config.columns_or_default());

    let controller = match model_path {
        Some(path) => {
            log::debug!("Loading model from '{}'", path.display());
            LocalModelController::from_file(&path)?
        }
        None => {
            log::warn!("No model configured; starting with an empty model.");
            LocalModelController::default()
        }
    };

    let mut shell = Shell::new(Arc::new(controller), Box::new(StdoutSink::new(columns)))?;

    if let Some(buffer) = cli.complete {
        for candidate in shell.complete(&buffer).candidates {
            println!("{}", candidate);
        }
        return Ok(());
    }

    if !cli.command.is_empty() {
        for line in &cli.command {
            shell.execute(line)?;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        println!("{}", t!("shell.info.welcome"));
        shell.run_line_editor()
    } else {
        shell.run_lines(stdin.lock())
    }
}
