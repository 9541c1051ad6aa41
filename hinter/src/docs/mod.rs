//! Documentation that covers the whole of Hinter rather than one crate.

pub mod api;
pub mod overview;
