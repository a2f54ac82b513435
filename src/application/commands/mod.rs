//! Slash-commands
//!
//! Commands form a closed set: the dispatcher matches on [`Command`] and
//! every variant must honour the same contract. A successful execution
//! appends at least one message to the session and returns the updated
//! session. A failed execution appends nothing.

pub mod duck;
pub mod help;
pub mod stop;

pub use duck::{DuckCommand, ExportPolicy};
pub use help::HelpCommand;
pub use stop::StopCommand;

use crate::application::errors::CommandError;
use crate::domain::entities::{ChatSession, CommandInfo, User};
use crate::domain::traits::{AudioPlayer, ChatStore, QueryEngine};

/// Collaborators handed to a command for one invocation
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub store: &'a dyn ChatStore,
    pub engine: &'a dyn QueryEngine,
    pub audio: &'a dyn AudioPlayer,
    /// Every registered command, in registration order
    pub catalog: &'a [CommandInfo],
}

/// Every command the application knows how to run
pub enum Command {
    Duck(DuckCommand),
    Stop(StopCommand),
    Help(HelpCommand),
}

impl Command {
    pub fn info(&self) -> &CommandInfo {
        match self {
            Command::Duck(cmd) => cmd.info(),
            Command::Stop(cmd) => cmd.info(),
            Command::Help(cmd) => cmd.info(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub async fn execute(
        &self,
        ctx: CommandContext<'_>,
        session: &ChatSession,
        acting_user: Option<&User>,
        args: &[String],
    ) -> Result<ChatSession, CommandError> {
        match self {
            Command::Duck(cmd) => cmd.execute(ctx, session, acting_user, args).await,
            Command::Stop(cmd) => cmd.execute(ctx, session, acting_user, args).await,
            Command::Help(cmd) => cmd.execute(ctx, session, acting_user, args).await,
        }
    }
}

impl From<DuckCommand> for Command {
    fn from(cmd: DuckCommand) -> Self {
        Command::Duck(cmd)
    }
}

impl From<StopCommand> for Command {
    fn from(cmd: StopCommand) -> Self {
        Command::Stop(cmd)
    }
}

impl From<HelpCommand> for Command {
    fn from(cmd: HelpCommand) -> Self {
        Command::Help(cmd)
    }
}
