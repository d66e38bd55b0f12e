//! Core types and error definitions for Scout.
//!
//! This crate provides the foundational types shared across all Scout crates:
//! the retrieval result model produced by search providers, the message model
//! persisted in sessions, and the unified error type.
//!
//! # Main types
//!
//! - [`ScoutError`] — Unified error enum for all Scout subsystems.
//! - [`ScoutResult`] — Convenience alias for `Result<T, ScoutError>`.
//! - [`SourceType`] — The closed set of information sources.
//! - [`RetrievalResult`] — One normalized hit from any provider.
//! - [`SourceRef`] — The wire/storage projection of a result.
//! - [`Role`] and [`Message`] — Conversation turns.

/// Unified error type.
pub mod error;
/// Conversation message types.
pub mod message;
/// Normalized retrieval results.
pub mod retrieval;

pub use error::{ScoutError, ScoutResult};
pub use message::{Message, Role};
pub use retrieval::{ResultMetadata, RetrievalResult, SourceRef, SourceType};
