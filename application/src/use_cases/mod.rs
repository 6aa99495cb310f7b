//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod ai_gateway;
pub mod run_turn;
