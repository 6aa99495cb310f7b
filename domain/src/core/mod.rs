//! Core domain concepts shared across all subdomains.
//!
//! - [`clock::Clock`]: epoch-millisecond time source injected into state mutators
//! - [`string`]: text helpers for summaries and previews

pub mod clock;
pub mod string;
