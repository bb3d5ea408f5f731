//! Festquest — Quest Progression bounded context.
//!
//! Responsible for the festival scavenger hunt: the step catalog, per-guest
//! progress, action validation, completion detection and the leaderboard.

pub mod application;
pub mod domain;
