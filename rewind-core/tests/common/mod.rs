//! Test infrastructure for rewind-core
//!
//! Provides an instrumented source and compact event formatting.

#![allow(dead_code)]

mod format;
mod scripted;

pub use format::{collect, drain, E};
pub use scripted::ScriptedSource;
