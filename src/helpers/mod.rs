//! Helper functions shared by the generator, templates and server

pub mod date;
pub mod html;
pub mod url;

pub use date::*;
pub use html::*;
pub use url::*;
