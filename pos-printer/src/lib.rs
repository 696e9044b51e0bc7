//! # pos-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building (styles, cut, drawer, EAN-13, raster)
//! - Fixed-width text layout (columns, money, separators)
//! - Legacy codepage conversion for Western receipt text
//! - Delivery strategies (TCP 9100, device file, CUPS spooler) with
//!   ordered fallback
//!
//! Business logic (WHAT to print) stays in application code: the
//! receipt composer lives in `print-relay`.
//!
//! ## Example
//!
//! ```ignore
//! use pos_printer::{Align, Codepage, EscPosBuilder, FallbackPrinter, PrintStrategy};
//!
//! let mut b = EscPosBuilder::new(42, Codepage::default());
//! b.align(Align::Center);
//! b.line("Ma Societe");
//! b.feed(4);
//! b.cut();
//!
//! let chain = FallbackPrinter::new(vec![PrintStrategy::network("192.168.1.50:9100")?]);
//! chain.submit(&b.into_bytes()).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod layout;
mod printer;

pub use encoding::Codepage;
pub use error::{PrintError, PrintResult};
pub use escpos::{Align, DrawerPin, EscPosBuilder, RasterImage, Size};
pub use layout::{format_money, row, separator, ColAlign, Column};
pub use printer::{
    DevicePrinter, FallbackPrinter, NetworkPrinter, PrintStrategy, Printer, SpoolerPrinter,
};

#[cfg(feature = "image")]
pub use escpos::rasterize_image;
