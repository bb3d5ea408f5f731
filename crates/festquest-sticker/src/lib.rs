//! Festquest — Sticker Compositing bounded context.
//!
//! Turns a guest's photo into a branded festival sticker: pick a template,
//! try to cut the subject out with a remote background-removal service, and
//! composite either the cutout or an elliptical crop of the photo onto the
//! rendered template.

pub mod application;
pub mod cutout;
pub mod domain;
pub mod render;
