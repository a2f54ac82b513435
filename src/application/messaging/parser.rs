//! Command parser - Splits raw chat input into a command name and arguments

/// A slash-command as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Recognises slash-commands in chat input
pub struct CommandParser {
    command_prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse a line of input. Returns `None` for ordinary chat text.
    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        let text = text.trim_start();

        let cmd_text = if text.starts_with('/') {
            &text[1..]
        } else if !self.command_prefix.is_empty() && text.starts_with(&self.command_prefix) {
            &text[self.command_prefix.len()..]
        } else {
            return None;
        };

        let mut parts = cmd_text.split_whitespace();
        let name = parts.next()?.to_lowercase();
        let args = parts.map(|s| s.to_string()).collect();

        Some(ParsedCommand { name, args })
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new("/")
    }
}
