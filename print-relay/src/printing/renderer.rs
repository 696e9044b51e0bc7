//! Receipt renderer
//!
//! Renders one order snapshot into ESC/POS bytes for thermal printers.
//! Section order is fixed; optional data is omitted, never defaulted.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, instrument};

use pos_printer::{
    format_money, row, separator, Align, Codepage, Column, DrawerPin, EscPosBuilder, Size,
};
use shared::{OrderLine, OrderSnapshot, RenderConfig};

/// Maximum logo width in pixels (print head dots)
const LOGO_MAX_WIDTH: u32 = 384;

/// Case-insensitive tokens marking a negative-price line as a discount
/// presentation line. Locale-sensitive by nature; changing this list
/// changes which lines are pulled out of the item table.
const DISCOUNT_TOKENS: [&str; 4] = ["remise", "discount", "%", "sur votre"];

/// Money comparison epsilon (one currency cent)
const MONEY_EPSILON: f64 = 0.01;

/// Receipt rendering errors
///
/// Only structural snapshot defects surface here; absent optional data
/// never fails a render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid order snapshot: {0}")]
    InvalidSnapshot(#[from] shared::SnapshotError),
}

/// Running figures accumulated while rendering the item table
struct ItemSummary {
    total_without_discount: f64,
    individual_discounts: f64,
    loyalty_discount_pct: Option<f64>,
}

/// Receipt renderer for one order snapshot
pub struct ReceiptRenderer<'a> {
    snapshot: &'a OrderSnapshot,
    config: &'a RenderConfig,
    reprint: bool,
}

impl<'a> ReceiptRenderer<'a> {
    pub fn new(snapshot: &'a OrderSnapshot, config: &'a RenderConfig) -> Self {
        Self {
            snapshot,
            config,
            reprint: false,
        }
    }

    /// Mark this render as a reprint: no cash-drawer pulse, an extra
    /// annotation above the cut.
    pub fn reprint(mut self, reprint: bool) -> Self {
        self.reprint = reprint;
        self
    }

    /// Render with the current wall clock
    pub fn render(&self) -> Result<Vec<u8>, RenderError> {
        self.render_at(Utc::now())
    }

    /// Render with an explicit clock (reprint annotations embed it)
    #[instrument(skip(self, now), fields(order = %self.snapshot.name, reprint = self.reprint))]
    pub fn render_at(&self, now: DateTime<Utc>) -> Result<Vec<u8>, RenderError> {
        self.snapshot.validate()?;

        let codepage = Codepage::for_label(&self.config.encoding);
        let mut b = EscPosBuilder::new(self.config.width, codepage);

        self.logo(&mut b);
        self.header(&mut b);
        self.metadata(&mut b);
        let summary = self.items(&mut b);
        self.global_discount_banner(&mut b, &summary);
        self.totals(&mut b, &summary);
        self.taxes(&mut b);
        self.payments(&mut b);
        self.loyalty(&mut b);
        self.footer(&mut b);
        self.barcode(&mut b);
        self.drawer_or_reprint(&mut b, now);

        b.feed(4);
        b.cut();

        let bytes = b.into_bytes();
        debug!(bytes = bytes.len(), "receipt rendered");
        Ok(bytes)
    }

    // === Sections ===

    fn logo(&self, b: &mut EscPosBuilder) {
        if !self.config.print_logo {
            return;
        }
        let Some(encoded) = self.snapshot.company.logo.as_deref() else {
            return;
        };

        use base64::Engine;
        let Ok(raw) = base64::engine::general_purpose::STANDARD.decode(encoded) else {
            debug!("logo base64 undecodable, skipping");
            return;
        };

        // Undecodable image data means no logo section, never a failure
        if let Some(raster) = pos_printer::rasterize_image(&raw, LOGO_MAX_WIDTH) {
            b.align(Align::Center);
            b.raster(&raster);
            b.feed(2);
        }
    }

    fn header(&self, b: &mut EscPosBuilder) {
        let company = &self.snapshot.company;

        b.align(Align::Center).bold(true).size(Size::DoubleHeight);
        b.line(&format!("--- {} ---", company.name));
        b.size(Size::Normal).bold(false);
        b.align(Align::Left);

        if let Some(phone) = &company.phone {
            b.line(&format!("Tel: {phone}"));
        }
        if let Some(email) = &company.email {
            b.line(email);
        }
        if let Some(website) = &company.website {
            b.line(website);
        }

        b.line(&self.sep());
    }

    fn metadata(&self, b: &mut EscPosBuilder) {
        let s = self.snapshot;

        b.line(&format!("Date : {}", s.date_order.format("%d/%m/%Y %H:%M")));
        b.line(&format!("Caisse : {} (ID:{})", s.register_name, s.register_id));

        if let Some(cashier) = &s.cashier {
            b.line(&format!("Caissier: {cashier}"));
        }
        if let Some(customer) = &s.customer {
            b.line(&format!("Client: {customer}"));
        }
        if let Some(table) = &s.table {
            b.line(&format!("Salle : {} - Table : {}", table.floor, table.table));
            if let Some(covers) = s.covers {
                b.line(&format!("Couvert(s): {covers}"));
            }
        }

        b.line(&self.sep());
    }

    /// Item table plus per-line discount sub-rows
    fn items(&self, b: &mut EscPosBuilder) -> ItemSummary {
        let width = self.config.width;

        b.bold(true);
        b.line(&row(
            width,
            &[
                Column::left("ARTICLES", 0.55),
                Column::right("Totals TTC", 0.25),
            ],
        ));
        b.bold(false);

        let fallback_rate = self.snapshot.first_positive_tax_rate();
        let mut summary = ItemSummary {
            total_without_discount: 0.0,
            individual_discounts: 0.0,
            loyalty_discount_pct: self
                .snapshot
                .lines
                .iter()
                .filter(|l| l.is_reward_line)
                .filter_map(|l| l.reward_discount_pct)
                .find(|pct| *pct > 0.0),
        };

        for line in self.snapshot.lines.iter().filter(|l| !is_discount_line(l)) {
            self.item_line(b, line, fallback_rate, &mut summary);
        }

        summary
    }

    fn item_line(
        &self,
        b: &mut EscPosBuilder,
        line: &OrderLine,
        fallback_rate: f64,
        summary: &mut ItemSummary,
    ) {
        let width = self.config.width;
        let tax_factor = 1.0 + line.tax_rate.unwrap_or(fallback_rate) / 100.0;
        let standard_price_ttc = line.standard_price * tax_factor;
        let is_free = line.price_subtotal_incl == 0.0;

        // A fully offered line must not by itself trigger the
        // "TOTAL SANS REMISE" reconciliation row
        if !is_free {
            summary.total_without_discount += standard_price_ttc * line.qty as f64;
        }

        let label = format!("({}) {}", line.qty, line.name);
        let amount = if is_free {
            "*OFFERT".to_string()
        } else {
            self.money(line.price_subtotal_incl)
        };

        b.bold(true);
        b.line(&row(
            width,
            &[Column::left(label, 0.65), Column::right(amount, 0.35)],
        ));
        b.bold(false);

        let effective_discount = if line.discount_pct > 0.0 {
            line.discount_pct
        } else {
            pricelist_discount(line)
        };

        if effective_discount > 0.0 && !is_free {
            let price_ttc = line.price_unit * tax_factor;
            let discount_amount = (standard_price_ttc - price_ttc) * line.qty as f64;
            summary.individual_discounts += discount_amount;
            b.line(&format!(
                "   Remise {effective_discount:.0}% (-{})",
                self.money(discount_amount)
            ));
        }

        b.newline();
    }

    fn global_discount_banner(&self, b: &mut EscPosBuilder, summary: &ItemSummary) {
        if let Some(pct) = summary.loyalty_discount_pct {
            b.line(&self.sep());
            b.align(Align::Center).bold(true);
            b.line(&format!("Remise de {pct:.0}% sur votre commande"));
            b.bold(false).align(Align::Left);
        }
        b.line(&self.sep());
    }

    fn totals(&self, b: &mut EscPosBuilder, summary: &ItemSummary) {
        let width = self.config.width;
        let s = self.snapshot;

        if summary.total_without_discount > s.amount_total + MONEY_EPSILON {
            b.line(&row(
                width,
                &[
                    Column::left("TOTAL SANS REMISE", 0.55),
                    Column::right(self.money(summary.total_without_discount), 0.25),
                ],
            ));
        }

        if summary.individual_discounts > 0.0 {
            b.line(&row(
                width,
                &[
                    Column::left("REMISES SUR PRODUITS", 0.55),
                    Column::right(self.money(summary.individual_discounts), 0.25),
                ],
            ));
        }

        let global_discount = summary.loyalty_discount_pct.map(|pct| {
            (summary.total_without_discount - summary.individual_discounts) * pct / 100.0
        });

        if let Some(global) = global_discount.filter(|g| *g > 0.0) {
            b.line(&row(
                width,
                &[
                    Column::left("REMISE GLOBALE", 0.55),
                    Column::right(self.money(global), 0.25),
                ],
            ));
        }

        let total_discount =
            summary.individual_discounts + global_discount.unwrap_or(0.0).max(0.0);
        if total_discount > 0.0 {
            b.line(&row(
                width,
                &[
                    Column::left("TOTAL DES REMISES", 0.55),
                    Column::right(self.money(total_discount), 0.25),
                ],
            ));
        }

        let sold_qty: i64 = s
            .lines
            .iter()
            .filter(|l| l.price_unit >= 0.0)
            .map(|l| l.qty)
            .sum();

        b.bold(true);
        b.line(&row(
            width,
            &[
                Column::left(format!("TOTAL A PAYER ({sold_qty})"), 0.55),
                Column::right(self.money(s.amount_total), 0.25),
            ],
        ));
        b.bold(false);
    }

    fn taxes(&self, b: &mut EscPosBuilder) {
        let s = self.snapshot;
        if s.amount_tax <= 0.0 || s.tax_details.is_empty() {
            return;
        }
        let width = self.config.width;

        b.newline();
        b.line(&row(
            width,
            &[
                Column::center("TAUX", 0.25),
                Column::right("HT", 0.25),
                Column::right("TVA", 0.25),
                Column::right("TTC", 0.25),
            ],
        ));
        b.line(&self.sep());

        let mut details = s.tax_details.clone();
        details.sort_by(|left, right| left.rate.total_cmp(&right.rate));

        for tax in &details {
            b.line(&row(
                width,
                &[
                    Column::center(format!("{:.0}%", tax.rate), 0.25),
                    Column::right(self.money(tax.base), 0.25),
                    Column::right(self.money(tax.amount), 0.25),
                    Column::right(self.money(tax.total), 0.25),
                ],
            ));
        }
    }

    fn payments(&self, b: &mut EscPosBuilder) {
        let s = self.snapshot;
        let width = self.config.width;

        // Refund entries carry negative amounts and are not tendered
        let tendered: Vec<_> = s.payments.iter().filter(|p| p.amount > 0.0).collect();
        if !tendered.is_empty() {
            b.newline();
            b.line("Encaissement:");
            for payment in tendered {
                b.line(&row(
                    width,
                    &[
                        Column::left(payment.method.clone(), 0.6),
                        Column::right(self.money(payment.amount), 0.4),
                    ],
                ));
            }
        }

        let change = s.total_tendered() - s.amount_total;
        if change > MONEY_EPSILON {
            b.line(&row(
                width,
                &[
                    Column::left("Rendu", 0.6),
                    Column::right(self.money(change), 0.4),
                ],
            ));
        }
    }

    fn loyalty(&self, b: &mut EscPosBuilder) {
        // Disabling the loyalty block suppresses the promo too: a shop
        // without a program has no card to advertise
        if !self.config.show_loyalty {
            return;
        }

        match self.snapshot.loyalty.as_ref() {
            Some(loyalty) => {
                b.newline();
                b.bold(true).align(Align::Center);
                b.line("******** VOTRE COMPTE FIDÉLITÉ ********");
                b.bold(false).align(Align::Left);

                b.line(&format!("Numéro Carte: {}", loyalty.card_number));
                b.line(&self.sep());

                let unit = &loyalty.point_name;
                if let Some(points) = loyalty.previous_points.filter(|p| *p > 0.0) {
                    b.line(&format!("Points de fidélité : {points:.1} {unit}"));
                }
                if let Some(points) = loyalty.points_earned.filter(|p| *p > 0.0) {
                    b.line(&format!("Points gagnés: +{points:.1} {unit}"));
                }
                if let Some(points) = loyalty.points_used.filter(|p| *p > 0.0) {
                    b.line(&format!("Points utilisés: {points:.1} {unit}"));
                }
                if loyalty.current_points > 0.0 {
                    b.bold(true);
                    b.line(&format!("Nouveau solde: {:.1} {unit}", loyalty.current_points));
                    b.bold(false);
                }
            }
            None => {
                b.newline();
                b.align(Align::Center).bold(true);
                b.line("*** PAS DE CARTE FIDÉLITÉ ? ***");
                b.bold(false);
                b.line("Demandez votre carte, elle est gratuite!");
                b.align(Align::Left);
            }
        }
    }

    fn footer(&self, b: &mut EscPosBuilder) {
        b.newline();
        b.align(Align::Center);
        b.line(&self.config.footer_message);
        b.line(&self.config.goodbye_message);
    }

    fn barcode(&self, b: &mut EscPosBuilder) {
        if !self.config.print_barcode {
            return;
        }
        b.feed(1);
        b.align(Align::Center);
        b.feed(1);

        let payload = match &self.snapshot.barcode_source {
            Some(source) => source.clone(),
            None => self.fallback_barcode(),
        };
        b.barcode_ean13(&payload);
    }

    /// store(2) + register(2) + MMDD + order id(4)
    fn fallback_barcode(&self) -> String {
        let s = self.snapshot;
        format!(
            "{:02}{:02}{}{:04}",
            s.company_id.rem_euclid(100),
            s.register_id.rem_euclid(100),
            s.date_order.format("%m%d"),
            s.id.rem_euclid(10_000)
        )
    }

    fn drawer_or_reprint(&self, b: &mut EscPosBuilder, now: DateTime<Utc>) {
        if self.reprint {
            b.align(Align::Center).bold(true);
            b.line(&format!(
                "*** Réimpression du Ticket {} ***",
                now.format("%Y-%m-%d %H:%M:%S")
            ));
            b.bold(false).align(Align::Left);
            return;
        }

        let cash_settled = self
            .snapshot
            .payments
            .iter()
            .any(|p| p.method.eq_ignore_ascii_case("cash"));
        if cash_settled {
            b.open_drawer(DrawerPin::Primary);
        }
    }

    // === Helpers ===

    fn sep(&self) -> String {
        separator(self.config.width, '-')
    }

    fn money(&self, amount: f64) -> String {
        let currency = &self.snapshot.company.currency;
        format_money(amount, &currency.symbol, currency.position)
    }
}

/// Presentation-only classification of discount lines
///
/// A line leaves the item table iff its unit price is negative and its
/// name carries a discount token. Totals computed upstream are never
/// affected by this.
fn is_discount_line(line: &OrderLine) -> bool {
    if line.price_unit >= 0.0 {
        return false;
    }
    let name = line.name.to_lowercase();
    DISCOUNT_TOKENS.iter().any(|token| name.contains(token))
}

/// Implicit discount inferred from the catalog list price
///
/// Only derived when no explicit discount is recorded.
fn pricelist_discount(line: &OrderLine) -> f64 {
    if line.standard_price > 0.0 && line.price_unit < line.standard_price && line.discount_pct == 0.0
    {
        (line.standard_price - line.price_unit) / line.standard_price * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        CompanyInfo, CurrencyInfo, CurrencyPosition, LoyaltyInfo, Payment, TableInfo, TaxLine,
    };

    const DRAWER_PULSE: [u8; 5] = [0x1B, 0x70, 0x00, 25, 250];
    const CUT: [u8; 3] = [0x1D, 0x56, 0x00];

    fn line(name: &str, qty: i64, price_unit: f64, rate: f64) -> OrderLine {
        let factor = 1.0 + rate / 100.0;
        OrderLine {
            name: name.to_string(),
            qty,
            price_unit,
            standard_price: price_unit,
            price_subtotal_incl: price_unit * factor * qty as f64,
            price_subtotal: price_unit * qty as f64,
            discount_pct: 0.0,
            tax_rate: Some(rate),
            is_reward_line: false,
            reward_discount_pct: None,
        }
    }

    fn snapshot() -> OrderSnapshot {
        // Two lines: 2 x 2000 TTC and 1 x 500 TTC at 20%, paid 3000 cash
        OrderSnapshot {
            name: "Shop/0042".to_string(),
            id: 42,
            company_id: 7,
            date_order: "2024-03-15T10:30:00Z".parse().unwrap(),
            company: CompanyInfo {
                name: "Chez Soa".to_string(),
                phone: Some("+261 20 22 123 45".to_string()),
                email: None,
                website: None,
                logo: None,
                currency: CurrencyInfo {
                    symbol: "Ar".to_string(),
                    position: CurrencyPosition::After,
                },
            },
            register_name: "Caisse 1".to_string(),
            register_id: 3,
            cashier: Some("Hery".to_string()),
            customer: None,
            table: None,
            covers: None,
            lines: vec![
                line("Mofo gasy", 2, 833.3333, 20.0),
                line("Ranovola", 1, 416.6667, 20.0),
            ],
            payments: vec![Payment {
                method: "Cash".to_string(),
                amount: 3000.0,
            }],
            amount_total: 2500.0,
            amount_tax: 416.67,
            loyalty: None,
            tax_details: vec![TaxLine {
                rate: 20.0,
                base: 2083.33,
                amount: 416.67,
                total: 2500.0,
            }],
            barcode_source: Some("070303154242".to_string()),
        }
    }

    fn config() -> RenderConfig {
        RenderConfig::default()
    }

    fn now() -> DateTime<Utc> {
        "2024-03-15T10:35:00Z".parse().unwrap()
    }

    fn render(snapshot: &OrderSnapshot, config: &RenderConfig) -> Vec<u8> {
        ReceiptRenderer::new(snapshot, config)
            .render_at(now())
            .unwrap()
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle)
            .count()
    }

    #[test]
    fn end_to_end_cash_receipt() {
        let snap = snapshot();
        let bytes = render(&snap, &config());

        // All sections present, in order
        let expected: &[&[u8]] = &[
            b"--- Chez Soa ---",
            b"Tel: +261 20 22 123 45",
            b"Date : 15/03/2024 10:30",
            b"Caisse : Caisse 1 (ID:3)",
            b"Caissier: Hery",
            b"ARTICLES",
            b"(2) Mofo gasy",
            b"2 000.00Ar",
            b"(1) Ranovola",
            b"500.00Ar",
            b"TOTAL A PAYER (3)",
            b"2 500.00Ar",
            b"TAUX",
            b"20%",
            b"Encaissement:",
            b"Cash",
            b"3 000.00Ar",
            b"Rendu",
            b"Merci de votre visite !",
            b"\x1D\x6B\x02070303154242\x00",
            &CUT,
        ];

        let mut last = 0;
        for needle in expected {
            let pos = find(&bytes[last..], needle)
                .unwrap_or_else(|| panic!("missing or out of order: {:?}", String::from_utf8_lossy(needle)));
            last += pos + needle.len();
        }

        // Change due: 3000 - 2500
        assert!(find(&bytes, b"500.00Ar").is_some());

        // Cash settlement on an original print pulses the drawer once
        assert_eq!(count(&bytes, &DRAWER_PULSE), 1);

        // No reconciliation row: totals match the standard prices
        assert!(find(&bytes, b"TOTAL SANS REMISE").is_none());
    }

    #[test]
    fn render_is_deterministic() {
        let snap = snapshot();
        let config = config();
        assert_eq!(render(&snap, &config), render(&snap, &config));
    }

    #[test]
    fn reprint_skips_drawer_and_annotates() {
        let snap = snapshot();
        let config = config();
        let bytes = ReceiptRenderer::new(&snap, &config)
            .reprint(true)
            .render_at(now())
            .unwrap();

        assert_eq!(count(&bytes, &DRAWER_PULSE), 0);
        // "Réimpression" with é encoded to windows-1252 0xE9
        assert!(find(&bytes, b"*** R\xE9impression du Ticket 2024-03-15 10:35:00 ***").is_some());
    }

    #[test]
    fn non_cash_payment_keeps_drawer_closed() {
        let mut snap = snapshot();
        snap.payments[0].method = "Carte".to_string();
        let bytes = render(&snap, &config());
        assert_eq!(count(&bytes, &DRAWER_PULSE), 0);
    }

    #[test]
    fn no_change_row_when_paid_exactly() {
        let mut snap = snapshot();
        snap.payments[0].amount = 2500.0;
        let bytes = render(&snap, &config());
        assert!(find(&bytes, b"Rendu").is_none());
    }

    #[test]
    fn pricelist_discount_prints_subrow_and_reconciliation() {
        let mut snap = snapshot();
        // Sold at 80% of the list price
        snap.lines[0].price_unit = 666.6667;
        snap.lines[0].price_subtotal_incl = 1600.0;
        snap.amount_total = 2100.0;

        let bytes = render(&snap, &config());

        assert!(find(&bytes, b"Remise 20% (-400.00Ar)").is_some());
        assert!(find(&bytes, b"TOTAL SANS REMISE").is_some());
        assert!(find(&bytes, b"REMISES SUR PRODUITS").is_some());
        assert!(find(&bytes, b"TOTAL DES REMISES").is_some());
    }

    #[test]
    fn explicit_discount_wins_over_pricelist() {
        let mut snap = snapshot();
        snap.lines[0].discount_pct = 15.0;
        snap.lines[0].price_unit = 666.6667;
        snap.lines[0].price_subtotal_incl = 1600.0;
        snap.amount_total = 2100.0;

        let bytes = render(&snap, &config());
        assert!(find(&bytes, b"Remise 15%").is_some());
    }

    #[test]
    fn free_line_renders_offert_and_skips_reconciliation() {
        let mut snap = snapshot();
        snap.lines = vec![OrderLine {
            price_subtotal_incl: 0.0,
            price_subtotal: 0.0,
            is_reward_line: true,
            ..line("Cafe offert", 1, 833.3333, 20.0)
        }];
        snap.payments.clear();
        snap.amount_total = 0.0;
        snap.amount_tax = 0.0;
        snap.tax_details.clear();

        let bytes = render(&snap, &config());

        assert!(find(&bytes, b"*OFFERT").is_some());
        // The offered line contributes nothing to the reconciliation row
        assert!(find(&bytes, b"TOTAL SANS REMISE").is_none());
        assert!(find(&bytes, b"Remise ").is_none());
    }

    #[test]
    fn discount_line_leaves_item_table() {
        let mut snap = snapshot();
        snap.lines.push(OrderLine {
            is_reward_line: true,
            reward_discount_pct: Some(10.0),
            ..line("Remise sur votre commande", 1, -250.0, 20.0)
        });
        snap.amount_total = 2200.0;

        let bytes = render(&snap, &config());

        // Not rendered as an item row
        assert!(find(&bytes, b"(1) Remise sur votre commande").is_none());
        // But announced as a global discount
        assert!(find(&bytes, b"Remise de 10% sur votre commande").is_some());
        assert!(find(&bytes, b"REMISE GLOBALE").is_some());
        // 10% of the 2500 standard-price total
        assert!(find(&bytes, b"250.00Ar").is_some());
        // Reconciliation row triggers: 3000 > 2200 + 0.01
        assert!(find(&bytes, b"TOTAL SANS REMISE").is_some());
    }

    #[test]
    fn total_a_payer_counts_only_sold_lines() {
        let mut snap = snapshot();
        snap.lines.push(OrderLine {
            is_reward_line: true,
            ..line("Remise sur votre commande", 1, -250.0, 20.0)
        });

        let bytes = render(&snap, &config());
        assert!(find(&bytes, b"TOTAL A PAYER (3)").is_some());
    }

    #[test]
    fn tax_table_omitted_without_tax() {
        let mut snap = snapshot();
        snap.amount_tax = 0.0;
        let bytes = render(&snap, &config());
        assert!(find(&bytes, b"TAUX").is_none());
    }

    #[test]
    fn tax_rows_sorted_ascending() {
        let mut snap = snapshot();
        snap.tax_details = vec![
            TaxLine {
                rate: 20.0,
                base: 1000.0,
                amount: 200.0,
                total: 1200.0,
            },
            TaxLine {
                rate: 5.0,
                base: 500.0,
                amount: 25.0,
                total: 525.0,
            },
        ];
        let bytes = render(&snap, &config());
        assert!(find(&bytes, b"5%").unwrap() < find(&bytes, b"20%").unwrap());
    }

    #[test]
    fn loyalty_block_lists_point_movements() {
        let mut snap = snapshot();
        snap.loyalty = Some(LoyaltyInfo {
            card_number: "C-1024".to_string(),
            program_name: "Loyalty Soa".to_string(),
            point_name: "pts".to_string(),
            current_points: 130.0,
            previous_points: Some(100.0),
            points_earned: Some(42.5),
            points_used: Some(12.5),
        });

        let bytes = render(&snap, &config());

        assert!(find(&bytes, b"Carte: C-1024").is_some());
        assert!(find(&bytes, b": 100.0 pts").is_some());
        assert!(find(&bytes, b"+42.5 pts").is_some());
        assert!(find(&bytes, b": 12.5 pts").is_some());
        assert!(find(&bytes, b"Nouveau solde: 130.0 pts").is_some());
        assert!(find(&bytes, b"PAS DE CARTE").is_none());
    }

    #[test]
    fn missing_loyalty_prints_promo_instead() {
        let bytes = render(&snapshot(), &config());
        assert!(find(&bytes, b"*** PAS DE CARTE FID").is_some());
        assert!(find(&bytes, b"Nouveau solde").is_none());
    }

    #[test]
    fn disabled_loyalty_display_omits_the_whole_section() {
        let mut snap = snapshot();
        snap.loyalty = Some(LoyaltyInfo {
            card_number: "C-1024".to_string(),
            program_name: "Loyalty Soa".to_string(),
            point_name: "pts".to_string(),
            current_points: 130.0,
            previous_points: None,
            points_earned: None,
            points_used: None,
        });
        let config = RenderConfig {
            show_loyalty: false,
            ..config()
        };

        let bytes = render(&snap, &config);
        assert!(find(&bytes, b"C-1024").is_none());
        assert!(find(&bytes, b"PAS DE CARTE").is_none());
    }

    #[test]
    fn refund_only_payments_omit_the_tender_header() {
        let mut snap = snapshot();
        snap.payments = vec![Payment {
            method: "Cash".to_string(),
            amount: -500.0,
        }];
        snap.amount_total = -500.0;

        let bytes = render(&snap, &config());
        assert!(find(&bytes, b"Encaissement:").is_none());
    }

    #[test]
    fn barcode_disabled_by_config() {
        let config = RenderConfig {
            print_barcode: false,
            ..config()
        };
        let bytes = render(&snapshot(), &config);
        assert!(find(&bytes, &[0x1D, 0x6B, 0x02]).is_none());
    }

    #[test]
    fn barcode_payload_derived_when_source_missing() {
        let mut snap = snapshot();
        snap.barcode_source = None;
        let bytes = render(&snap, &config());
        // company 7, register 3, 15 March, order 42
        assert!(find(&bytes, b"\x1D\x6B\x02070303150042\x00").is_some());
    }

    #[test]
    fn table_context_rendered_when_present() {
        let mut snap = snapshot();
        snap.table = Some(TableInfo {
            floor: "Terrasse".to_string(),
            table: "T5".to_string(),
        });
        snap.covers = Some(4);

        let bytes = render(&snap, &config());
        assert!(find(&bytes, b"Salle : Terrasse - Table : T5").is_some());
        assert!(find(&bytes, b"Couvert(s): 4").is_some());
    }

    #[test]
    fn invalid_snapshot_is_rejected() {
        let mut snap = snapshot();
        snap.amount_total = f64::NAN;
        let config = config();
        assert!(ReceiptRenderer::new(&snap, &config).render_at(now()).is_err());
    }

    #[test]
    fn init_is_first_and_cut_is_last() {
        let bytes = render(&snapshot(), &config());
        // Init, then code-table selection, before any other output
        assert_eq!(&bytes[..5], &[0x1B, 0x40, 0x1B, 0x74, 16]);
        assert_eq!(&bytes[bytes.len() - 3..], &CUT);
    }
}
