//! Legacy codepage handling for receipt text
//!
//! Thermal printers render text through single-byte code tables selected
//! with ESC t. Text is encoded at write time, one string at a time, so
//! command bytes, bitmap data and barcode payloads never pass through a
//! text transformation - re-encoding a finished buffer would corrupt
//! any command parameter byte >= 0x80.

use tracing::warn;

/// A printer code table paired with its text encoding
///
/// The ESC t table number and the byte layout must match, otherwise
/// accented characters print as the wrong glyphs.
#[derive(Debug, Clone, Copy)]
pub struct Codepage {
    encoding: &'static encoding_rs::Encoding,
    table: u8,
}

/// Western European (WPC1252), ESC t 16
const WINDOWS_1252: Codepage = Codepage {
    encoding: encoding_rs::WINDOWS_1252,
    table: 16,
};

/// Cyrillic (PC866), ESC t 17
const IBM866: Codepage = Codepage {
    encoding: encoding_rs::IBM866,
    table: 17,
};

impl Codepage {
    /// Resolve a codepage from a configuration label
    ///
    /// Unknown labels fall back to windows-1252, which covers the
    /// Western European accent repertoire receipts use.
    pub fn for_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "windows-1252" | "cp1252" | "latin1" => WINDOWS_1252,
            "ibm866" | "cp866" => IBM866,
            other => {
                warn!(label = other, "unknown codepage label, using windows-1252");
                WINDOWS_1252
            }
        }
    }

    /// ESC t selector for this code table
    pub fn select_bytes(&self) -> [u8; 3] {
        [0x1B, 0x74, self.table]
    }

    /// Encode one text run to this codepage
    ///
    /// ASCII passes through unchanged; unmappable characters are
    /// substituted, never dropped.
    pub fn encode_text(&self, s: &str) -> Vec<u8> {
        let (encoded, _, _) = self.encoding.encode(s);
        encoded.into_owned()
    }
}

impl Default for Codepage {
    fn default() -> Self {
        WINDOWS_1252
    }
}
