//! Core library for the loginstat-tools command line application.
//!
//! The library exposes high-level orchestration helpers that power the
//! command-line interface as well as the unit tests. The modules are
//! structured to keep responsibilities narrow and composable: IO adapters
//! live under [`io`], data representations inside [`model`], the statistics
//! tree expansion in [`flatten`], sheet assembly in [`sheets`], and the
//! export orchestration under [`export`].

pub mod error;
pub mod export;
pub mod flatten;
pub mod io;
pub mod model;
pub mod sheets;

pub use error::{ExportError, Result};
