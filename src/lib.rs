//! Client for publishing versioned prompts to a prompt hub and loading them
//! back as runnable objects.

pub mod client;
pub mod error;
pub mod hub;
pub mod load;
pub mod model;
pub mod runnable;
pub mod store;

pub use client::HubClient;
pub use error::HubError;
pub use hub::{ModelClass, NamedModelClass, PullOptions, PushOptions, pull, pull_with, push, push_with};
pub use model::{ClientConfig, PromptIdentifier};
pub use runnable::{Runnable, RunnableRef};
