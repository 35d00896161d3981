use clap::Parser;
use std::path::PathBuf;

pub mod arg_spec;
pub mod completion;
pub mod context;
pub mod dispatcher;
pub mod handlers;
pub mod registry;

/// Builds the dynamic, color-aware full help string at runtime.
fn build_help_string() -> &'static str {
    // Replaces the semantic tags of the help template with terminal styles.
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let template = t!("cli.help.template");

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let hl = if use_colors { "\x1b[1;36m" } else { "" }; // Bold Cyan
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = template
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// modelsh: an interactive administration shell for hierarchical management models.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// JSON document describing the management model. Overrides `model` in the config file.
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Configuration file to use instead of the default location.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output width for column listings. Overrides `columns` in the config file.
    #[arg(long, value_name = "N")]
    pub columns: Option<usize>,

    /// Runs a shell line and exits. May be repeated; lines run in order and the first
    /// failure stops the run.
    #[arg(short = 'c', long = "command", value_name = "LINE", allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// Prints the completion candidates for a partial line, one per line, and exits.
    #[arg(long, value_name = "BUFFER", allow_hyphen_values = true)]
    pub complete: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "modelsh",
            "--model",
            "model.json",
            "--columns",
            "100",
            "-c",
            "cd /subsystem=logging",
            "-c",
            "ls",
        ])
        .unwrap();
        assert_eq!(cli.model, Some(PathBuf::from("model.json")));
        assert_eq!(cli.columns, Some(100));
        assert_eq!(cli.command, vec!["cd /subsystem=logging", "ls"]);
        assert!(cli.complete.is_none());
    }

    #[test]
    fn test_complete_buffer_keeps_spaces() {
        let cli = Cli::try_parse_from(["modelsh", "--complete", "command --action="]).unwrap();
        assert_eq!(cli.complete.as_deref(), Some("command --action="));
    }

    #[test]
    fn test_help_template_has_no_tags_left() {
        let help = build_help_string();
        assert!(!help.contains("<title>"));
        assert!(!help.contains("</cmd>"));
    }
}
