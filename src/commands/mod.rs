//! Command implementations
//!
//! Each module corresponds to an action of the CLI.

pub mod push;

pub use push::{PushArgs, PushOutcome};
