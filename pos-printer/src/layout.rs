//! Fixed-width text layout
//!
//! Column justification, money formatting and separators, independent of
//! printer semantics. Every function is a pure function of its inputs,
//! so receipts can be unit-tested against literal expected strings.

use rust_decimal::prelude::*;
use shared::CurrencyPosition;

/// Column alignment within its allocated width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColAlign {
    Left,
    Center,
    Right,
}

/// One column of a [`row`]
///
/// `width` is a fraction of the total row width (0..1). The last column
/// of a row ignores its fraction and absorbs all remaining characters.
#[derive(Debug, Clone)]
pub struct Column {
    pub text: String,
    pub width: f64,
    pub align: ColAlign,
}

impl Column {
    pub fn left(text: impl Into<String>, width: f64) -> Self {
        Self {
            text: text.into(),
            width,
            align: ColAlign::Left,
        }
    }

    pub fn right(text: impl Into<String>, width: f64) -> Self {
        Self {
            text: text.into(),
            width,
            align: ColAlign::Right,
        }
    }

    pub fn center(text: impl Into<String>, width: f64) -> Self {
        Self {
            text: text.into(),
            width,
            align: ColAlign::Center,
        }
    }
}

/// Lay out one line of columns over exactly `width` characters
///
/// Each column gets `floor(width * fraction)` characters except the
/// last, which receives whatever is left (absorbing the rounding).
/// Overlong text is truncated to the column width minus one plus a `.`
/// marker. For any fraction set summing to <= 1 the output length
/// equals `width` exactly.
pub fn row(width: usize, columns: &[Column]) -> String {
    let mut result = String::with_capacity(width);
    let mut remaining = width;
    let last = columns.len().saturating_sub(1);

    for (i, col) in columns.iter().enumerate() {
        let col_width = if i == last {
            remaining
        } else {
            ((width as f64 * col.width) as usize).min(remaining)
        };
        remaining -= col_width;
        result.push_str(&fit(&col.text, col_width, col.align));
    }

    result
}

/// Repeated-character line of exact length `width`
pub fn separator(width: usize, ch: char) -> String {
    ch.to_string().repeat(width)
}

/// Format a money amount with grouped thousands and a currency symbol
///
/// Two decimal places, round half to even, a space every three integer
/// digits. Non-finite input renders as `0.00`. The symbol is attached
/// without a separating space on either side.
pub fn format_money(amount: f64, symbol: &str, position: CurrencyPosition) -> String {
    let amount_str = if amount.is_finite() {
        Decimal::from_f64(amount)
            .map(|d| group_thousands(&format!("{:.2}", d.round_dp(2))))
            .unwrap_or_else(|| "0.00".to_string())
    } else {
        "0.00".to_string()
    };

    match position {
        CurrencyPosition::Before => format!("{symbol}{amount_str}"),
        CurrencyPosition::After => format!("{amount_str}{symbol}"),
    }
}

/// Truncate or pad `text` to exactly `col_width` characters
fn fit(text: &str, col_width: usize, align: ColAlign) -> String {
    let len = text.chars().count();
    let text: String = if len > col_width {
        match col_width {
            0 => String::new(),
            w => {
                let mut truncated: String = text.chars().take(w - 1).collect();
                truncated.push('.');
                truncated
            }
        }
    } else {
        text.to_string()
    };

    let pad = col_width - text.chars().count();
    match align {
        ColAlign::Left => format!("{text}{}", " ".repeat(pad)),
        ColAlign::Right => format!("{}{text}", " ".repeat(pad)),
        ColAlign::Center => {
            let left = pad / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(pad - left))
        }
    }
}

/// Insert a space every three digits of the integer part
///
/// `formatted` is a plain `-?\d+\.\d{2}` string.
fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = rest.split_once('.').unwrap_or((rest, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    format!("{sign}{grouped}.{frac_part}")
}
