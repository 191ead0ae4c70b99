//! Household eligibility screening for public-assistance programs.
//!
//! The [`workflows::screening`] module holds the pure evaluation engine together
//! with the repository boundary and HTTP router that front it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
