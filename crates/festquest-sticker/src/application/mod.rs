//! Application services for the Sticker Compositing context.

pub mod pipeline;
