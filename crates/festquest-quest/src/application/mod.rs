//! Application services for the Quest Progression context.

pub mod command_handlers;
pub mod query_handlers;
