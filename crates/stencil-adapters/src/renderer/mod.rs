//! Template renderers.

mod simple;

pub use simple::{SimpleRenderer, TEMPLATE_SUFFIX};
