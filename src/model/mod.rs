pub mod config;
pub mod identifier;
pub mod prompt;

pub use config::ClientConfig;
pub use identifier::PromptIdentifier;
pub use prompt::{CommitEntry, CommitList, PromptCommit, PromptMetadata, Repo, Settings};
