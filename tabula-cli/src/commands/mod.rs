//! Command implementations for the Tabula CLI.

pub mod sessions;
