//! Tests for the scripted procedure interpreter
//!
//! Organized by feature area

mod basic_tests;
mod helpers;
mod validator_tests;
