//! Order snapshot - the immutable input of one receipt render
//!
//! The snapshot is assembled by the business system and consumed exactly
//! once by the receipt composer. Optional sections (loyalty, table,
//! logo, customer) are represented as `Option`, never as sentinel
//! values, so "absent" and "zero" cannot be confused downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural snapshot defects
///
/// These indicate a broken upstream data contract. The composer surfaces
/// them to the caller; it never guesses replacement values.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("line {index} ({name:?}): quantity must be positive, got {qty}")]
    InvalidQuantity { index: usize, name: String, qty: i64 },
}

/// Where the currency symbol goes relative to the amount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyPosition {
    Before,
    #[default]
    After,
}

/// Currency display info
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyInfo {
    pub symbol: String,
    #[serde(default)]
    pub position: CurrencyPosition,
}

/// Issuing company block printed in the receipt header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Logo image, base64-encoded (PNG/JPEG). Undecodable data is
    /// treated as an absent logo, never as a render failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub currency: CurrencyInfo,
}

/// Restaurant seating context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableInfo {
    pub floor: String,
    pub table: String,
}

/// One order line
///
/// All amounts are in the order's currency. `price_unit` and
/// `standard_price` are tax-exclusive bases; tax-inclusive values are
/// derived from them with the line's tax rate. `price_subtotal_incl`
/// is the tax-inclusive line total as computed upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub name: String,
    pub qty: i64,
    /// Applied unit price, tax-exclusive. Negative on discount lines.
    pub price_unit: f64,
    /// Catalog list price, tax-exclusive, before any discount.
    #[serde(default)]
    pub standard_price: f64,
    pub price_subtotal_incl: f64,
    #[serde(default)]
    pub price_subtotal: f64,
    /// Explicitly recorded discount, percent (0 when none).
    #[serde(default)]
    pub discount_pct: f64,
    /// Tax rate applied to this line, percent. `None` falls back to the
    /// order's first positive line rate at render time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    /// Line generated by the promotions/loyalty engine.
    #[serde(default)]
    pub is_reward_line: bool,
    /// Percent discount carried by a percent-discount reward line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_discount_pct: Option<f64>,
}

/// One settled payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub method: String,
    /// Negative amounts are refunds; only positive amounts count toward
    /// the tendered total.
    pub amount: f64,
}

/// Loyalty account state after this order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoyaltyInfo {
    pub card_number: String,
    pub program_name: String,
    /// Unit label for point values ("pts", "points", ...)
    #[serde(default = "default_point_name")]
    pub point_name: String,
    pub current_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_used: Option<f64>,
}

fn default_point_name() -> String {
    "pts".to_string()
}

/// Tax aggregation for one distinct rate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxLine {
    /// Rate in percent
    pub rate: f64,
    /// Tax-exclusive base
    pub base: f64,
    /// Tax amount
    pub amount: f64,
    /// Tax-inclusive total
    pub total: f64,
}

/// Order snapshot - everything one receipt render needs
///
/// `amount_total` and `amount_tax` are computed upstream independently
/// of the line sums; the composer must not assume they match the sum of
/// lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Order reference ("Shop/0042")
    pub name: String,
    pub id: i64,
    pub company_id: i64,
    pub date_order: DateTime<Utc>,

    pub company: CompanyInfo,

    pub register_name: String,
    pub register_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covers: Option<u32>,

    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub payments: Vec<Payment>,

    pub amount_total: f64,
    #[serde(default)]
    pub amount_tax: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<LoyaltyInfo>,

    /// One entry per distinct tax rate, ascending by rate.
    #[serde(default)]
    pub tax_details: Vec<TaxLine>,

    /// Source string for the receipt barcode. When absent, a payload is
    /// derived from company/register/date/order identifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode_source: Option<String>,
}

fn require_finite(value: f64, field: &'static str) -> Result<(), SnapshotError> {
    if !value.is_finite() {
        return Err(SnapshotError::NotFinite { field, value });
    }
    Ok(())
}

impl OrderSnapshot {
    /// Structural validation, run before rendering.
    ///
    /// Missing optional data is fine; non-numeric money or non-positive
    /// quantities on sellable lines are contract violations.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        require_finite(self.amount_total, "amount_total")?;
        require_finite(self.amount_tax, "amount_tax")?;

        for (index, line) in self.lines.iter().enumerate() {
            require_finite(line.price_unit, "price_unit")?;
            require_finite(line.price_subtotal_incl, "price_subtotal_incl")?;
            require_finite(line.standard_price, "standard_price")?;
            require_finite(line.discount_pct, "discount_pct")?;

            if !line.is_reward_line && line.qty <= 0 {
                return Err(SnapshotError::InvalidQuantity {
                    index,
                    name: line.name.clone(),
                    qty: line.qty,
                });
            }
        }

        Ok(())
    }

    /// First positive tax rate found on any line, in percent.
    ///
    /// Used as the fallback rate for lines that carry none.
    pub fn first_positive_tax_rate(&self) -> f64 {
        self.lines
            .iter()
            .filter_map(|l| l.tax_rate)
            .find(|r| *r > 0.0)
            .unwrap_or(0.0)
    }

    /// Sum of positive payment amounts (amount tendered).
    pub fn total_tendered(&self) -> f64 {
        self.payments
            .iter()
            .filter(|p| p.amount > 0.0)
            .map(|p| p.amount)
            .sum()
    }
}
