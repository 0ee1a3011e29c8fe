//! # AI Processing
//!
//! Everything that talks to the external chat-completion service: the HTTP
//! client, the tolerant JSON-extraction utility, and the batch orchestrator
//! for the classification and requirement-analysis stages.

pub mod client;
pub mod extract;
pub mod orchestrator;

pub use client::{AiError, ChatClient, ChatClientConfig};
pub use extract::extract_json;
pub use orchestrator::{ClassificationResult, Orchestrator, RequirementResult, WireFeedbackItem};
