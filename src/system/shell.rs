// EN: src/system/shell.rs

use crate::{
    cli::{
        completion::Completion,
        context::CommandContext,
        dispatcher,
        handlers::{
            command::CommandCommandHandler,
            generic_type::create_generic_type_handler,
            navigation::{ChangeNodeHandler, ListNodeHandler},
        },
        registry::{CommandRegistry, RegistryError},
    },
    constants::META_COMMAND_NAME,
    system::{console::OutputSink, controller::ModelControllerClient},
};
use anyhow::Result;
use colored::Colorize;
use rustyline::{
    Context, Editor, Helper, completion::Completer, error::ReadlineError,
    highlight::Highlighter, hint::Hinter, history::DefaultHistory, validate::Validator,
};
use std::{io::BufRead, sync::Arc};

/// Registers the commands every session starts with.
pub fn register_builtins(registry: &CommandRegistry) -> Result<(), RegistryError> {
    registry.register(
        META_COMMAND_NAME,
        Arc::new(CommandCommandHandler::new(
            registry.clone(),
            create_generic_type_handler,
        )),
    )?;
    registry.register("cd", Arc::new(ChangeNodeHandler::default()))?;
    registry.register("ls", Arc::new(ListNodeHandler::default()))?;
    Ok(())
}

/// Prints `Error: <message>` to stderr.
pub fn print_error(error: &anyhow::Error) {
    eprintln!("{}: {}", "Error".red().bold(), error);
}

/// One interactive session: the command registry plus the state handlers work on.
#[derive(Debug)]
pub struct Shell {
    registry: CommandRegistry,
    ctx: CommandContext,
}

impl Shell {
    /// A session at the model root with the built-in commands registered.
    pub fn new(
        client: Arc<dyn ModelControllerClient>,
        output: Box<dyn OutputSink>,
    ) -> Result<Self, RegistryError> {
        let registry = CommandRegistry::new();
        register_builtins(&registry)?;
        Ok(Self {
            registry,
            ctx: CommandContext::new(client, output),
        })
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    pub fn execute(&mut self, line: &str) -> Result<()> {
        dispatcher::dispatch(line, &self.registry, &mut self.ctx)
    }

    pub fn complete(&self, buffer: &str) -> Completion {
        dispatcher::complete(buffer, &self.registry, &self.ctx)
    }

    pub fn prompt(&self) -> String {
        format!(
            t!("shell.prompt"),
            path = self.ctx.format_address(self.ctx.current_node())
        )
    }

    /// Runs every line of `input`, for piped scripts.
    ///
    /// A failing line is reported and the run goes on.
    pub fn run_lines(&mut self, input: impl BufRead) -> Result<()> {
        for line in input.lines() {
            if let Err(e) = self.execute(&line?) {
                print_error(&e);
            }
        }
        Ok(())
    }

    /// Reads lines from the terminal with editing, history and Tab completion until EOF.
    ///
    /// Ctrl-C drops the current line. A failing line is reported and the loop goes on.
    pub fn run_line_editor(self) -> Result<()> {
        let mut rl: Editor<LineHelper, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(LineHelper { shell: self }));

        loop {
            let prompt = rl
                .helper()
                .map(|helper| helper.shell.prompt())
                .unwrap_or_default();
            let line = match rl.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };
            if dispatcher::is_ignored(&line) {
                continue;
            }
            rl.add_history_entry(line.as_str()).ok();

            let Some(helper) = rl.helper_mut() else {
                break;
            };
            if let Err(e) = helper.shell.execute(&line) {
                print_error(&e);
            }
        }
        Ok(())
    }
}

/// Connects the line editor to a shell: Tab asks the shell for candidates.
#[derive(Debug)]
struct LineHelper {
    shell: Shell,
}

impl Completer for LineHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let completion = self.shell.complete(line.get(..pos).unwrap_or(line));
        Ok((completion.offset, completion.candidates))
    }
}

impl Hinter for LineHelper {
    type Hint = String;
}

impl Highlighter for LineHelper {}

impl Validator for LineHelper {}

impl Helper for LineHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cli::{handlers::command::CommandError, registry::HandlerKind},
        system::{
            console::{Printed, RecordingSink},
            local_model::fixtures::datasources_model,
        },
    };
    use std::io::Cursor;

    fn shell() -> (Shell, RecordingSink) {
        let output = RecordingSink::new();
        let shell = Shell::new(Arc::new(datasources_model()), Box::new(output.clone())).unwrap();
        (shell, output)
    }

    #[test]
    fn test_builtins_are_registered_and_not_generic() {
        let (shell, _) = shell();
        assert_eq!(
            shell.registry().names_for_completion(),
            vec!["cd", "command", "ls"]
        );
        for name in ["cd", "command", "ls"] {
            let kind = shell.registry().get(name).map(|h| h.kind());
            assert_eq!(kind, Some(HandlerKind::BuiltIn));
        }
    }

    #[test]
    fn test_builtins_cannot_be_removed() {
        let (mut shell, _) = shell();
        for name in ["cd", "command", "ls"] {
            let err = shell
                .execute(&format!("command remove --command-name={}", name))
                .unwrap_err();
            assert_eq!(
                err.downcast_ref::<CommandError>(),
                Some(&CommandError::NotGeneric(name.to_string()))
            );
        }
    }

    #[test]
    fn test_registered_command_runs() {
        let (mut shell, output) = shell();
        shell.execute("cd /subsystem=datasources").unwrap();
        shell
            .execute("command add --node-type=data-source --property-id=pool-name --command-name=ds")
            .unwrap();
        shell.execute("ds").unwrap();
        shell.execute("ds --pool-name=ExampleDS").unwrap();

        assert_eq!(
            output.printed(),
            vec![
                Printed::Columns(vec!["ExampleDS".to_string(), "ReportsDS".to_string()]),
                Printed::Line("driver-name=h2".to_string()),
                Printed::Line("jndi-name=java:jboss/datasources/ExampleDS".to_string()),
                Printed::Line("pool-name=ExamplePool".to_string()),
            ]
        );

        shell.execute("command remove --command-name=ds").unwrap();
        assert!(shell.execute("ds").is_err());
    }

    #[test]
    fn test_prompt_follows_current_node() {
        let (mut shell, _) = shell();
        assert!(shell.prompt().contains('/'));
        shell.execute("cd /subsystem=logging").unwrap();
        assert!(shell.prompt().contains("/subsystem=logging"));
        assert_eq!(
            shell.context().current_node().to_string(),
            "/subsystem=logging"
        );
    }

    #[test]
    fn test_complete_command_names_and_arguments() {
        let (shell, _) = shell();
        assert_eq!(shell.complete("c").candidates, vec!["cd", "command"]);
        assert_eq!(
            shell.complete("command --action=").candidates,
            vec!["add", "list", "remove"]
        );
        assert_eq!(
            shell.complete("ls /subsystem=d").candidates,
            vec!["/subsystem=datasources"]
        );
    }

    #[test]
    fn test_tab_completes_text_before_the_cursor() {
        let (shell, _) = shell();
        let helper = LineHelper { shell };
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (offset, candidates) = helper.complete("command --action=", 17, &ctx).unwrap();
        assert_eq!(offset, 17);
        assert_eq!(candidates, vec!["add", "list", "remove"]);

        let line = "command --action=add --node-type=/subsystem=datasources/data-source --property-id=";
        let (offset, candidates) = helper.complete(line, line.len(), &ctx).unwrap();
        assert_eq!(offset, line.len());
        assert_eq!(candidates, vec!["datasource-class", "pool-name"]);

        // Cursor after "c" with text to its right.
        let (offset, candidates) = helper.complete("c /subsystem=logging", 1, &ctx).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(candidates, vec!["cd", "command"]);
    }

    #[test]
    fn test_piped_lines_keep_going_after_errors() {
        let (mut shell, output) = shell();
        let script = "# setup\n\nnonsense\ncd /subsystem=nowhere\nls /subsystem=logging\n";
        shell.run_lines(Cursor::new(script)).unwrap();
        assert_eq!(
            output.printed(),
            vec![Printed::Columns(vec!["console-handler".to_string()])]
        );
    }
}
