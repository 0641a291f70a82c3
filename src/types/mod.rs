//! Core types shared by the provider, agents and orchestrator.

pub mod message;

pub use message::{ChatTurn, ContentBlock, Role, Usage};
