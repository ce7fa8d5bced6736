//! Data models for the Prefilheus admin backend.
//!
//! Records mirror the remote collection's columns; filters and reports are
//! transient values recomputed on every query.

mod filter;
mod record;
mod report;

pub use filter::*;
pub use record::*;
pub use report::*;
