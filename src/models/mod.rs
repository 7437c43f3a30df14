//! Request and report models for the loader binary
//!
//! This module defines the DTOs used for deserializing load requests and
//! serializing commit reports.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{LoadEntry, LoadRequest};
pub use responses::CommitReport;
