use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

use crate::application::commands::{Command, CommandContext};
use crate::application::errors::CommandError;
use crate::application::messaging::CommandParser;
use crate::domain::entities::{ChatMessage, ChatSession, CommandInfo, User};
use crate::domain::traits::{AudioPlayer, ChatStore, QueryEngine};

/// Collaborator handles shared by every command
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn ChatStore>,
    pub engine: Arc<dyn QueryEngine>,
    pub audio: Arc<dyn AudioPlayer>,
}

/// Service for registering and executing commands
pub struct CommandService {
    commands: Vec<Command>,
    catalog: Vec<CommandInfo>,
    parser: CommandParser,
    collaborators: Collaborators,
    session_locks: SessionLocks,
}

type SessionLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Exclusive turn on one session. The map entry is evicted on drop once
/// no other caller holds or waits on it.
struct SessionTurn<'a> {
    locks: &'a SessionLocks,
    session_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionTurn<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let idle = locks
            .get(&self.session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            locks.remove(&self.session_id);
        }
    }
}

impl CommandService {
    pub fn new(prefix: impl Into<String>, collaborators: Collaborators) -> Self {
        Self {
            commands: Vec::new(),
            catalog: Vec::new(),
            parser: CommandParser::new(prefix),
            collaborators,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&mut self, command: impl Into<Command>) -> Result<(), CommandError> {
        let command = command.into();
        if self.find(command.name()).is_some() {
            return Err(CommandError::Duplicate(command.name().to_string()));
        }
        tracing::debug!("Registered command {}", command.info().display_form);
        self.catalog.push(command.info().clone());
        self.commands.push(command);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.info().matches(name))
    }

    /// Registered commands, in registration order
    pub fn catalog(&self) -> &[CommandInfo] {
        &self.catalog
    }

    pub fn prefix(&self) -> &str {
        self.parser.prefix()
    }

    pub fn store(&self) -> &Arc<dyn ChatStore> {
        &self.collaborators.store
    }

    /// Handle one line of user input.
    ///
    /// Slash-commands are dispatched by name; anything else is appended to
    /// the session as a human message.
    pub async fn handle(
        &self,
        session: &ChatSession,
        acting_user: Option<&User>,
        input: &str,
    ) -> Result<ChatSession, CommandError> {
        match self.parser.parse(input) {
            Some(parsed) => {
                self.execute(session, acting_user, &parsed.name, &parsed.args)
                    .await
            }
            None => {
                let _turn = self.lock_session(session.id()).await;
                let message = ChatMessage::human(input).with_author(acting_user);
                Ok(self.collaborators.store.append_message(session, message).await?)
            }
        }
    }

    /// Run a command by name against a session.
    ///
    /// Executions against the same session are serialized.
    pub async fn execute(
        &self,
        session: &ChatSession,
        acting_user: Option<&User>,
        name: &str,
        args: &[String],
    ) -> Result<ChatSession, CommandError> {
        let command = self
            .find(name)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;

        let _turn = self.lock_session(session.id()).await;

        let ctx = CommandContext {
            store: self.collaborators.store.as_ref(),
            engine: self.collaborators.engine.as_ref(),
            audio: self.collaborators.audio.as_ref(),
            catalog: &self.catalog,
        };

        tracing::info!(
            "Executing {} in session {} ({} args)",
            command.info().display_form,
            session.id(),
            args.len()
        );

        match command.execute(ctx, session, acting_user, args).await {
            Ok(updated) => {
                tracing::debug!("Session {} now has {} messages", updated.id(), updated.len());
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", command.info().display_form, e);
                Err(e)
            }
        }
    }

    /// Sessions with a command running or waiting
    pub fn tracked_sessions(&self) -> usize {
        self.session_locks
            .lock()
            .map(|locks| locks.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    async fn lock_session(&self, session_id: &str) -> SessionTurn<'_> {
        let lock = {
            let mut locks = self
                .session_locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        let mut turn = SessionTurn {
            locks: &self.session_locks,
            session_id: session_id.to_string(),
            guard: None,
        };
        turn.guard = Some(lock.lock_owned().await);
        turn
    }
}
