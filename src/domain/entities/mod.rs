//! Domain entities - Core chat objects with no external dependencies

pub mod user;
pub mod message;
pub mod session;
pub mod command;

pub use user::User;
pub use message::{ChatMessage, MessageRole};
pub use session::ChatSession;
pub use command::CommandInfo;
