//! Receipt composition
//!
//! Turns one [`shared::OrderSnapshot`] into one finished ESC/POS byte
//! buffer. This module owns all receipt business rules: discount
//! classification, tax display, loyalty fallback, reprint and
//! cash-drawer branching.

mod renderer;

pub use renderer::{ReceiptRenderer, RenderError};
