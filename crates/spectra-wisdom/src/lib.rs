//! Accumulated transform-planner wisdom.
//!
//! Wisdom records which solver a planner chose for a given problem and
//! flags, so later runs can skip re-measurement. This crate stores it,
//! merges it, and moves it in and out of the process as text.
//!
//! - [`WisdomStore`] is an owned store with every transport as a method.
//! - [`global`] holds the process-wide store that planners share, plus
//!   the one-shot callback hooks.
//!
//! Merging is additive. An imported entry for an already-known problem
//! and flags pair replaces the old one; a rejected import changes nothing.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod entry;
pub mod error;
pub mod global;
pub mod store;

pub use config::WisdomConfig;
pub use entry::{format_document, parse_str, ParseError, WisdomEntry, WisdomKey, DOCUMENT_TAG};
pub use error::{ImportPath, WisdomError};
pub use store::WisdomStore;
