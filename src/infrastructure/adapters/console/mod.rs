//! Console adapter for local use

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::domain::entities::{ChatMessage, MessageRole};

/// Line-based terminal front end
pub struct ConsoleAdapter {
    prompt: String,
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleAdapter {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next non-empty line, or `None` at end of input
    pub async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            print!("{}", self.prompt);
            std::io::stdout().flush()?;

            match self.lines.next_line().await? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(line.trim().to_string())),
                None => return Ok(None),
            }
        }
    }

    pub fn render(&self, message: &ChatMessage) {
        println!("{}", format_message(message));
    }

    pub fn render_error(&self, error: &dyn std::fmt::Display) {
        eprintln!("[error] {}", error);
    }
}

fn format_message(message: &ChatMessage) -> String {
    let who = match (message.role(), message.author()) {
        (MessageRole::Human, Some(user)) => user.display_name(),
        (role, _) => role.as_str().to_string(),
    };
    format!("[{}] {}", who, message.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;

    #[test]
    fn human_messages_show_author() {
        let user = User::new("42").with_username("ada");
        let msg = ChatMessage::human("hi").with_author(Some(&user));
        assert_eq!(format_message(&msg), "[ada] hi");
    }

    #[test]
    fn other_messages_show_role() {
        assert_eq!(format_message(&ChatMessage::system("done")), "[system] done");
    }
}
