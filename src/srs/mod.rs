//! The spaced-repetition / mastery-progression engine.
//!
//! Pure decision logic lives in `mastery`, `batch`, `recommend`,
//! `discovery` and `level`; `eligibility` is the one store-coupled sweep,
//! and `engine` is the facade the HTTP handlers consume.

pub mod batch;
pub mod config;
pub mod discovery;
pub mod eligibility;
pub mod engine;
pub mod level;
pub mod mastery;
pub mod recommend;
pub mod types;
