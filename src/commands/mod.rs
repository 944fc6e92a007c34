//! Command implementations for the modsync CLI

pub mod completions;
mod helpers;
pub mod list;
pub mod sync;
pub mod version;
