//! HTTP request handlers.

pub(crate) mod info;
pub(crate) mod render;
