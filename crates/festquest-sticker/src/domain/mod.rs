//! Domain model for the Sticker Compositing context.

pub mod errors;
pub mod layout;
pub mod template;
