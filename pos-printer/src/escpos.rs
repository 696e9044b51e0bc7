//! ESC/POS command builder
//!
//! Produces exact control-byte sequences for thermal receipt printers.
//! The builder owns one growing byte buffer. Text is encoded to the
//! device codepage as it is written, so command parameters, bitmap data
//! and barcode payloads are never re-interpreted as text.

use crate::encoding::Codepage;

/// Text alignment (ESC a)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Character size (ESC !)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Normal,
    DoubleHeight,
}

/// Cash drawer connector pin (ESC p)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerPin {
    Primary,
    Alternate,
}

impl DrawerPin {
    /// Pulse command for this pin (25ms on, 250ms off)
    pub fn pulse(self) -> [u8; 5] {
        match self {
            DrawerPin::Primary => [0x1B, 0x70, 0x00, 25, 250],
            DrawerPin::Alternate => [0x1B, 0x70, 0x01, 25, 250],
        }
    }
}

/// 1-bit-per-pixel raster bitmap, MSB first within each byte
///
/// `width_bytes` must equal `ceil(width_px / 8)`; the constructor
/// enforces row alignment against the data length. A mismatched width
/// prints garbage but never crashes the printer, so this is the only
/// validation performed.
#[derive(Debug, Clone)]
pub struct RasterImage {
    data: Vec<u8>,
    width_bytes: u16,
    height: u16,
}

impl RasterImage {
    /// Wrap pre-packed bitmap rows. Returns `None` when `data` is not
    /// exactly `width_bytes * height` bytes.
    pub fn new(data: Vec<u8>, width_bytes: u16, height: u16) -> Option<Self> {
        if data.len() != width_bytes as usize * height as usize {
            return None;
        }
        Some(Self {
            data,
            width_bytes,
            height,
        })
    }

    pub fn width_bytes(&self) -> u16 {
        self.width_bytes
    }

    pub fn height(&self) -> u16 {
        self.height
    }
}

/// ESC/POS command builder
///
/// `new()` emits the printer init sequence followed by the code-table
/// selector, so init always precedes any other output. Style toggles
/// are explicit; callers keep on/off pairs balanced, there is no
/// implicit reset between sections.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
    codepage: Codepage,
}

impl EscPosBuilder {
    /// Create a builder for the given paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 42 or 48 characters
    pub fn new(width: usize, codepage: Codepage) -> Self {
        let mut buf = Vec::with_capacity(4096);
        // Initialize printer (ESC @), then select the code table
        buf.extend_from_slice(&[0x1B, 0x40]);
        buf.extend_from_slice(&codepage.select_bytes());
        Self {
            buf,
            width,
            codepage,
        }
    }

    /// Configured paper width
    pub fn width(&self) -> usize {
        self.width
    }

    // === Text Output ===

    /// Write text, encoded to the device codepage
    pub fn text(&mut self, s: &str) -> &mut Self {
        let encoded = self.codepage.encode_text(s);
        self.buf.extend_from_slice(&encoded);
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    /// Write an empty line
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    /// Print and feed n lines (ESC d n)
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    // === Style ===

    /// Toggle bold (ESC E)
    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, on as u8]);
        self
    }

    /// Set alignment (ESC a)
    pub fn align(&mut self, align: Align) -> &mut Self {
        let n = match align {
            Align::Left => 0x00,
            Align::Center => 0x01,
            Align::Right => 0x02,
        };
        self.buf.extend_from_slice(&[0x1B, 0x61, n]);
        self
    }

    /// Set character size (ESC !)
    pub fn size(&mut self, size: Size) -> &mut Self {
        let n = match size {
            Size::Normal => 0x00,
            Size::DoubleHeight => 0x10,
        };
        self.buf.extend_from_slice(&[0x1B, 0x21, n]);
        self
    }

    // === Actions ===

    /// Full cut (GS V 0)
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }

    /// Cash drawer pulse on the given pin
    ///
    /// At most once per receipt, only for cash settlement, never on a
    /// reprint.
    pub fn open_drawer(&mut self, pin: DrawerPin) -> &mut Self {
        self.buf.extend_from_slice(&pin.pulse());
        self
    }

    // === Barcode ===

    /// EAN-13 barcode from an arbitrary source string
    ///
    /// Digits are extracted, truncated to the first 12, then zero-filled
    /// on the left to exactly 12. This normalization is deterministic
    /// and lossy on purpose; it is never an error. The symbol prints
    /// 100 dots tall, module width 3, human-readable digits below.
    pub fn barcode_ean13(&mut self, raw: &str) -> &mut Self {
        let digits = normalize_ean13(raw);

        // GS h 100 - height, GS w 3 - module width,
        // GS H 2 - HRI below, GS f 0 - HRI font A
        self.buf.extend_from_slice(&[0x1D, 0x68, 100]);
        self.buf.extend_from_slice(&[0x1D, 0x77, 3]);
        self.buf.extend_from_slice(&[0x1D, 0x48, 2]);
        self.buf.extend_from_slice(&[0x1D, 0x66, 0]);

        // GS k 2 - EAN-13, 12 data digits, NUL terminator
        self.buf.extend_from_slice(&[0x1D, 0x6B, 0x02]);
        self.buf.extend_from_slice(digits.as_bytes());
        self.buf.push(0x00);
        self
    }

    // === Raster Image ===

    /// Raster bit image (GS v 0)
    pub fn raster(&mut self, image: &RasterImage) -> &mut Self {
        self.buf.extend_from_slice(&[
            0x1D,
            0x76,
            0x30,
            0x00,
            (image.width_bytes & 0xFF) as u8,
            (image.width_bytes >> 8) as u8,
            (image.height & 0xFF) as u8,
            (image.height >> 8) as u8,
        ]);
        self.buf.extend_from_slice(&image.data);
        self
    }

    // === Build ===

    /// Finish and take the accumulated bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Current buffer contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(42, Codepage::default())
    }
}

/// Extract digits, truncate right to 12, zero-fill left to 12
fn normalize_ean13(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(12).collect();
    format!("{digits:0>12}")
}

// ============================================================================
// Image Processing
// ============================================================================

/// Convert arbitrary image bytes to a 1-bit raster for printing
///
/// The image is decoded, downscaled proportionally when wider than
/// `max_width` pixels, grayscaled, and thresholded at mid-luminance
/// (dark pixels print). Returns `None` when the bytes are not a
/// decodable image; callers treat that as an absent logo, never as a
/// render failure.
#[cfg(feature = "image")]
pub fn rasterize_image(bytes: &[u8], max_width: u32) -> Option<RasterImage> {
    use image::GenericImageView;
    use tracing::{debug, warn};

    let img = match image::load_from_memory(bytes) {
        Ok(i) => i,
        Err(e) => {
            warn!(error = %e, "logo decode failed, skipping");
            return None;
        }
    };

    let (w, h) = img.dimensions();
    debug!(width = w, height = h, "logo decoded");

    let (new_w, new_h) = if w > max_width {
        let ratio = max_width as f64 / w as f64;
        (max_width, (h as f64 * ratio) as u32)
    } else {
        (w, h)
    };
    if new_w == 0 || new_h == 0 || new_h > u16::MAX as u32 {
        return None;
    }

    let gray = img
        .resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3)
        .to_luma8();

    let width_bytes = new_w.div_ceil(8);
    let mut data = Vec::with_capacity((width_bytes * new_h) as usize);

    for y in 0..new_h {
        for x_byte in 0..width_bytes {
            let mut byte = 0u8;
            for bit in 0..8 {
                let x = x_byte * 8 + bit;
                if x < new_w && gray.get_pixel(x, y)[0] < 128 {
                    byte |= 1 << (7 - bit);
                }
            }
            data.push(byte);
        }
    }

    RasterImage::new(data, width_bytes as u16, new_h as u16)
}
