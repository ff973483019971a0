//! UI modules for potd
//!
//! Rendering only. Every decision about what to show comes from
//! `RetryPolicy::view` over the fetch controller's state.

mod picture_view;
mod theme;

pub use picture_view::render_picture_view;
pub use theme::Theme;
