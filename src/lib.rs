pub mod cli;
pub mod config;
pub mod errors;
pub mod interpreter;
pub mod proc;

// Re-export main types
pub use errors::ErrorInfo;
pub use proc::{ProcError, ProcHandle, Procedure, StepOutcome, Val};

// Re-export script API for convenience
pub use interpreter::{Registry, Script, ScriptError};
