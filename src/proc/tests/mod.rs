//! Tests for the proc engine
//!
//! Organized by component

mod helpers;
mod run_tests;
