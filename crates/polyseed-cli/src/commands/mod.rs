//! Subcommand handlers.
//!
//! Handlers return `Result<(), String>`; `main` prints the error in the
//! selected output mode and sets the exit code.

pub mod demo;
pub mod lang;
pub mod seed;
