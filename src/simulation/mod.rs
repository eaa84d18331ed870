//! Headless simulation support
//!
//! Builds Bevy apps without rendering so the pursuit AI can run in tools
//! and tests.

mod app_builder;

pub use app_builder::*;
