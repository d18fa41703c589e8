//! Stage orchestration.
//!
//! # Responsibility
//! - Run hierarchy stages over snapshot batches.
//! - Keep CLI callers decoupled from hierarchy internals.

pub mod pipeline;
