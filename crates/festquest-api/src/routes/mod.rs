//! Route modules organized by bounded context.

pub mod health;
pub mod quest;
pub mod sticker;
