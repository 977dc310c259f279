pub mod pipeline;
pub mod prompt;
pub mod types;

pub use pipeline::ChatPipeline;
pub use types::{ChatMessage, ChatPayload};
