//! `/stop` - interrupt speech playback

use super::CommandContext;
use crate::application::errors::CommandError;
use crate::domain::entities::{ChatMessage, ChatSession, CommandInfo, User};

pub struct StopCommand {
    info: CommandInfo,
}

impl StopCommand {
    pub fn new() -> Self {
        Self {
            info: CommandInfo::new("stop", "/stop", "Stop speaking (use `clear` to cut off immediately)")
                .with_usage("/stop [clear]"),
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
        let clear_only = match args {
            [] => false,
            [arg] if arg.eq_ignore_ascii_case("clear") => true,
            _ => {
                return Err(CommandError::InvalidArgs(format!(
                    "expected `{}`",
                    self.info.usage.as_deref().unwrap_or("/stop")
                )))
            }
        };

        let was_playing = ctx.audio.is_playing().await;
        if clear_only {
            ctx.audio.clear_immediately().await?;
        } else {
            ctx.audio.stop_gracefully().await?;
        }

        let text = match (was_playing, clear_only) {
            (false, true) => "Nothing is playing. Audio queue cleared.",
            (false, false) => "Nothing is playing. Audio queue disabled.",
            (true, true) => "Speech cleared.",
            (true, false) => "Speech stopped. The current clip will finish.",
        };
        tracing::info!("Audio interrupted (clear_only={}, was_playing={})", clear_only, was_playing);

        let message = ChatMessage::system(text).with_author(acting_user);
        Ok(ctx.store.append_message(session, message).await?)
    }
}

impl Default for StopCommand {
    fn default() -> Self {
        Self::new()
    }
}
