//! Platform services injected into the buffer controller

pub mod clipboard;
pub mod fs;
pub mod preview;
pub mod rich_text;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
