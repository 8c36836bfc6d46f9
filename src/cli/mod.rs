//! Command Line Interface (CLI) layer for BVPRO.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for a single product run. It
//! wires user-provided options to the underlying library functionality
//! exposed via `bvpro::api`.
//!
//! If you are embedding BVPRO into another application, prefer using the
//! high-level `bvpro::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
