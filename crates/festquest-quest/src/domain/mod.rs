//! Domain model for the Quest Progression context.

pub mod aggregates;
pub mod catalog;
pub mod commands;
pub mod errors;
