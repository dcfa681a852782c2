//! Core types & traits: protocol envelopes, error taxonomy, content blocks and
//! the declarative operation descriptor.

pub mod content;
pub mod error;
pub mod mcp;
pub mod tool;
