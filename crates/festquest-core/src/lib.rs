//! Festquest Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the quest and
//! sticker bounded contexts depend on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod cutout;
pub mod error;
pub mod ids;
pub mod repository;
pub mod rng;
