//! `/help` - list commands

use super::CommandContext;
use crate::application::errors::CommandError;
use crate::domain::entities::{ChatMessage, ChatSession, CommandInfo, User};

pub struct HelpCommand {
    info: CommandInfo,
}

impl HelpCommand {
    pub fn new() -> Self {
        Self {
            info: CommandInfo::new("help", "/help", "Show available commands")
                .with_usage("/help [command]"),
        }
    }

    pub fn info(&self) -> &CommandInfo {
        &self.info
    }

    pub async fn execute(
        &self,
        ctx: CommandContext<'_>,
        session: &ChatSession,
        acting_user: Option<&User>,
        args: &[String],
    ) -> Result<ChatSession, CommandError> {
        let text = match args.first() {
            Some(name) => command_help(ctx.catalog, name.trim_start_matches('/'))?,
            None => command_list(ctx.catalog),
        };

        let message = ChatMessage::system(text).with_author(acting_user);
        Ok(ctx.store.append_message(session, message).await?)
    }
}

impl Default for HelpCommand {
    fn default() -> Self {
        Self::new()
    }
}

fn command_list(catalog: &[CommandInfo]) -> String {
    let mut help = "Available commands:".to_string();
    for cmd in catalog {
        help.push_str(&format!("\n  {} - {}", cmd.display_form, cmd.description));
    }
    help
}

fn command_help(catalog: &[CommandInfo], name: &str) -> Result<String, CommandError> {
    let cmd = catalog
        .iter()
        .find(|c| c.matches(name))
        .ok_or_else(|| CommandError::NotFound(name.to_string()))?;

    let mut help = format!("{} - {}", cmd.display_form, cmd.description);
    if let Some(usage) = &cmd.usage {
        help.push_str(&format!("\nUsage: {}", usage));
    }
    Ok(help)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CommandInfo> {
        vec![
            CommandInfo::new("duck", "/duck", "Do some SQL queries").with_usage("/duck [sql]"),
            CommandInfo::new("stop", "/stop", "Stop speaking"),
        ]
    }

    #[test]
    fn list_keeps_registration_order() {
        let text = command_list(&catalog());
        let duck = text.find("/duck").unwrap();
        let stop = text.find("/stop").unwrap();
        assert!(duck < stop);
    }

    #[test]
    fn single_command_shows_usage() {
        let text = command_help(&catalog(), "DUCK").unwrap();
        assert_eq!(text, "/duck - Do some SQL queries\nUsage: /duck [sql]");
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(
            command_help(&catalog(), "nope"),
            Err(CommandError::NotFound(name)) if name == "nope"
        ));
    }
}
