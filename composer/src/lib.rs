//! Proposal text generation.
//!
//! Builds the structured prompt for a project and sends it to the
//! generative-language API in a single request/response exchange. A static
//! template covers graphics projects, which never go through the model.

pub mod client;
pub mod error;
pub mod prompt;

pub use client::ComposerClient;
pub use error::ComposerError;
pub use prompt::{graphics_proposal, proposal_prompt};
