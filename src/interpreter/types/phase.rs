//! Execution phase enums for each statement type
//!
//! Each statement type has its own Phase enum that tracks which execution step
//! it's currently at.

/// Execution phase for Block statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPhase {
    /// Open the block's scope
    Enter,
    /// Run the statement at `idx`
    Execute,
}

/// Execution phase for statements whose value may come from a yield
/// (Let, Assign, Expr, Return)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalPhase {
    /// Evaluate the expression, or yield it to the engine
    Eval,
    /// Consume the value the engine resumed with
    Resume,
}

/// Execution phase for If statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfPhase {
    Eval,
    /// Chosen branch finished
    Done,
}

/// Execution phase for While statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhilePhase {
    /// Evaluate the loop condition
    Check,
    /// Body finished normally
    Body,
}

/// Execution phase for Try statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryPhase {
    Enter,
    /// Executing the try block
    Body,
    /// Executing the catch block (error was caught)
    Catch,
    /// Executing the finally block
    Finally,
}
