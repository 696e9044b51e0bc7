//! Per-device render configuration
//!
//! Changes rarely; constructed once per relay process and handed to the
//! composer. Nothing outside this struct affects the rendered bytes.

use serde::{Deserialize, Serialize};

/// Rendering options for one receipt printer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Paper width in characters (32 for 58mm, 42/48 for 80mm)
    pub width: usize,
    /// Codepage label for receipt text ("windows-1252", "ibm866")
    pub encoding: String,
    pub print_logo: bool,
    pub print_barcode: bool,
    pub show_loyalty: bool,
    pub footer_message: String,
    pub goodbye_message: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 42,
            encoding: "windows-1252".to_string(),
            print_logo: true,
            print_barcode: true,
            show_loyalty: true,
            footer_message: "Merci de votre visite !".to_string(),
            goodbye_message: "A bientôt !".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_receipt_conventions() {
        let config = RenderConfig::default();
        assert_eq!(config.width, 42);
        assert!(config.print_barcode);
        assert_eq!(config.footer_message, "Merci de votre visite !");
    }
}
