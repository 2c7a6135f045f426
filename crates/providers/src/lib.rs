//! Completion providers.
//!
//! Only the local completion endpoint is supported; it speaks a minimal
//! `{messages, max_tokens} -> {content}` JSON protocol.

pub mod local;

pub use local::LocalCompletionClient;
