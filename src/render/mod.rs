//! Rendering contract - substitutes renderers for semantic element kinds

mod components;

pub use components::*;
