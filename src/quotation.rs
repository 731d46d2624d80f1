// 📨 Quotations - pricing requests sent to suppliers
//
// Three shapes of the same thing:
// - QuotationDraft: the "new quotation" form before it is sent
// - Quotation: the request as issued, with its status
// - ResponseForm / QuotationResponse: the supplier filling in prices

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::entities::ProductCatalog;
use crate::error::{ProcurementError, Result};
use crate::round_cents;

/// Longest note accepted on a quotation or a response
pub const NOTE_MAX_CHARS: usize = 500;

// ============================================================================
// STATUS / KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    /// Sent, waiting for the supplier
    Open,

    /// Supplier returned prices
    Answered,

    /// Deadline passed without an answer
    Unanswered,
}

impl QuotationStatus {
    pub const ALL: [QuotationStatus; 3] = [
        QuotationStatus::Open,
        QuotationStatus::Answered,
        QuotationStatus::Unanswered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Open => "Open",
            QuotationStatus::Answered => "Answered",
            QuotationStatus::Unanswered => "Unanswered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "em_aberto" => Some(QuotationStatus::Open),
            "answered" | "respondida" => Some(QuotationStatus::Answered),
            "unanswered" | "nao_respondida" => Some(QuotationStatus::Unanswered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationKind {
    /// Sent to the supplier as a link to the response form
    Automatic,

    /// Prices collected by hand (supplier website, phone)
    Manual,
}

impl QuotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationKind::Automatic => "Automatic",
            QuotationKind::Manual => "Manual",
        }
    }

    /// Letter used in quotation codes: COT-A-001, COT-M-001
    pub fn code_letter(&self) -> char {
        match self {
            QuotationKind::Automatic => 'A',
            QuotationKind::Manual => 'M',
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            QuotationKind::Automatic => QuotationKind::Manual,
            QuotationKind::Manual => QuotationKind::Automatic,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "automatic" | "automatica" | "automática" => Some(QuotationKind::Automatic),
            "manual" => Some(QuotationKind::Manual),
            _ => None,
        }
    }
}

// ============================================================================
// RESPONSE DEADLINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseDeadline {
    Hours(u32),
    NoDeadline,
}

impl ResponseDeadline {
    /// Deadlines a quotation can be given
    pub const OPTIONS: [ResponseDeadline; 10] = [
        ResponseDeadline::Hours(2),
        ResponseDeadline::Hours(4),
        ResponseDeadline::Hours(6),
        ResponseDeadline::Hours(8),
        ResponseDeadline::Hours(12),
        ResponseDeadline::Hours(18),
        ResponseDeadline::Hours(24),
        ResponseDeadline::Hours(48),
        ResponseDeadline::Hours(72),
        ResponseDeadline::NoDeadline,
    ];

    /// 0 means no deadline; anything outside OPTIONS is rejected
    pub fn from_hours(hours: u32) -> Option<Self> {
        if hours == 0 {
            return Some(ResponseDeadline::NoDeadline);
        }
        let candidate = ResponseDeadline::Hours(hours);
        Self::OPTIONS.contains(&candidate).then_some(candidate)
    }

    pub fn hours(&self) -> Option<u32> {
        match self {
            ResponseDeadline::Hours(h) => Some(*h),
            ResponseDeadline::NoDeadline => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ResponseDeadline::Hours(h) => format!("{} hours", h),
            ResponseDeadline::NoDeadline => "No deadline".to_string(),
        }
    }

    pub fn due_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.hours().map(|h| issued_at + Duration::hours(i64::from(h)))
    }

    /// Next option, wrapping around (used by the dashboard)
    pub fn cycle(&self) -> Self {
        let index = Self::OPTIONS.iter().position(|d| d == self).unwrap_or(0);
        Self::OPTIONS[(index + 1) % Self::OPTIONS.len()]
    }
}

impl Default for ResponseDeadline {
    fn default() -> Self {
        ResponseDeadline::Hours(24)
    }
}

/// "45 min", "5 h", "3 days"
pub fn format_span(span: Duration) -> String {
    let minutes = span.num_minutes().abs();
    if minutes < 60 {
        format!("{} min", minutes)
    } else if minutes < 48 * 60 {
        let hours = minutes / 60;
        let rest = minutes % 60;
        if rest == 0 {
            format!("{} h", hours)
        } else {
            format!("{} h {} min", hours, rest)
        }
    } else {
        format!("{} days", minutes / (24 * 60))
    }
}

// ============================================================================
// QUOTATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,

    /// Catalogue reference price at the time the quotation was issued
    pub average_price: f64,
}

impl QuotationItem {
    pub fn estimated_total(&self) -> f64 {
        round_cents(self.average_price * f64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedPrice {
    pub product_id: String,
    pub unit_price: f64,
}

/// Prices returned by the supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationResponse {
    pub prices: Vec<QuotedPrice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub submitted_at: DateTime<Utc>,

    /// SHA-256 of the submitted prices and note, used to spot resubmissions
    pub fingerprint: String,
}

impl QuotationResponse {
    pub fn price_for(&self, product_id: &str) -> Option<f64> {
        self.prices
            .iter()
            .find(|p| p.product_id == product_id)
            .map(|p| p.unit_price)
    }

    pub fn compute_fingerprint(prices: &[QuotedPrice], note: Option<&str>) -> String {
        let mut sorted: Vec<&QuotedPrice> = prices.iter().collect();
        sorted.sort_by(|a, b| a.product_id.cmp(&b.product_id));

        let mut hasher = Sha256::new();
        for price in sorted {
            hasher.update(format!("{}={:.4};", price.product_id, price.unit_price));
        }
        hasher.update(note.unwrap_or_default());
        format!("{:x}", hasher.finalize())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: String,

    /// Human code, e.g. COT-A-001
    pub code: String,

    pub name: String,
    pub issued_at: DateTime<Utc>,

    pub supplier_id: String,
    pub supplier_name: String,

    pub deadline: ResponseDeadline,
    pub items: Vec<QuotationItem>,
    pub status: QuotationStatus,
    pub kind: QuotationKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Supplier web shop, for manual quotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<QuotationResponse>,
}

impl Quotation {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Σ average price × quantity
    pub fn estimated_total(&self) -> f64 {
        round_cents(self.items.iter().map(|i| i.average_price * f64::from(i.quantity)).sum())
    }

    /// Total of the supplier's prices, once answered
    pub fn response_total(&self) -> Option<f64> {
        let response = self.response.as_ref()?;
        Some(round_cents(
            self.items
                .iter()
                .map(|item| response.price_for(&item.product_id).unwrap_or(0.0) * f64::from(item.quantity))
                .sum(),
        ))
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.deadline.due_at(self.issued_at)
    }

    /// Still open but past its deadline
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == QuotationStatus::Open && self.due_at().map_or(false, |due| due <= now)
    }

    /// "in 5 h", "2 h ago", "no deadline"
    pub fn remaining_label(&self, now: DateTime<Utc>) -> String {
        match self.due_at() {
            None => "no deadline".to_string(),
            Some(due) if due >= now => format!("in {}", format_span(due - now)),
            Some(due) => format!("{} ago", format_span(now - due)),
        }
    }

    /// Time between issue and answer
    pub fn response_time(&self) -> Option<Duration> {
        self.response.as_ref().map(|r| r.submitted_at - self.issued_at)
    }

    /// Path of the supplier-facing response form
    pub fn form_path(&self) -> String {
        format!("/quotations/{}/form", self.id)
    }

    pub fn share_message(&self, base_url: &str) -> String {
        format!(
            "Hello! We have a new quotation for you ({}). Please open the link to respond: {}{}",
            self.code,
            base_url.trim_end_matches('/'),
            self.form_path()
        )
    }

    /// wa.me link carrying the share message
    pub fn whatsapp_link(&self, base_url: &str) -> String {
        format!(
            "https://wa.me/?text={}",
            urlencoding::encode(&self.share_message(base_url))
        )
    }
}

// ============================================================================
// NEW QUOTATION DRAFT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftItem {
    pub product_id: String,
    pub quantity: u32,
}

/// State of the "new quotation" form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotationDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub deadline: ResponseDeadline,
    #[serde(default)]
    pub items: Vec<DraftItem>,
    #[serde(default)]
    pub note: String,
}

impl QuotationDraft {
    pub fn new(name: impl Into<String>) -> Self {
        QuotationDraft {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_supplier(mut self, supplier_id: impl Into<String>) -> Self {
        self.supplier_id = Some(supplier_id.into());
        self
    }

    /// Adds the item with quantity 1; already-present items are left alone
    pub fn add_item(&mut self, product_id: &str) {
        if !self.contains(product_id) {
            self.items.push(DraftItem {
                product_id: product_id.to_string(),
                quantity: 1,
            });
        }
    }

    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(ProcurementError::InvalidQuantity {
                item: product_id.to_string(),
                value: 0.0,
            });
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| ProcurementError::ProductNotFound(product_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    pub fn set_note(&mut self, note: &str) -> Result<()> {
        check_note(note)?;
        self.note = note.to_string();
        Ok(())
    }

    /// Catalogue products not yet in the draft
    pub fn available_products<'a>(&self, catalog: &'a ProductCatalog) -> Vec<&'a crate::entities::Product> {
        catalog
            .all()
            .iter()
            .filter(|p| !self.contains(&p.id))
            .collect()
    }

    /// Σ average price × quantity; unknown products count as 0
    pub fn estimated_total(&self, catalog: &ProductCatalog) -> f64 {
        round_cents(
            self.items
                .iter()
                .map(|item| {
                    catalog
                        .find_by_id(&item.product_id)
                        .map_or(0.0, |p| p.average_price)
                        * f64::from(item.quantity)
                })
                .sum(),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ProcurementError::InvalidDraft("name is required".into()));
        }
        if self.supplier_id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            return Err(ProcurementError::InvalidDraft("a supplier must be selected".into()));
        }
        if self.items.is_empty() {
            return Err(ProcurementError::InvalidDraft("at least one item is required".into()));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity == 0) {
            return Err(ProcurementError::InvalidQuantity {
                item: item.product_id.clone(),
                value: 0.0,
            });
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(item) = self.items.iter().find(|i| !seen.insert(i.product_id.as_str())) {
            return Err(ProcurementError::InvalidDraft(format!(
                "product {} is listed more than once",
                item.product_id
            )));
        }
        check_note(&self.note)
    }

    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }
}

fn check_note(note: &str) -> Result<()> {
    let chars = note.chars().count();
    if chars > NOTE_MAX_CHARS {
        return Err(ProcurementError::InvalidDraft(format!(
            "note has {} characters, limit is {}",
            chars, NOTE_MAX_CHARS
        )));
    }
    Ok(())
}

// ============================================================================
// SUPPLIER RESPONSE FORM
// ============================================================================

/// Price form a supplier fills in for one quotation
#[derive(Debug, Clone)]
pub struct ResponseForm {
    pub quotation_id: String,
    items: Vec<QuotationItem>,
    prices: BTreeMap<String, f64>,
    note: String,
}

impl ResponseForm {
    /// Every item starts at price 0
    pub fn new(quotation: &Quotation) -> Self {
        ResponseForm {
            quotation_id: quotation.id.clone(),
            items: quotation.items.clone(),
            prices: quotation
                .items
                .iter()
                .map(|item| (item.product_id.clone(), 0.0))
                .collect(),
            note: String::new(),
        }
    }

    /// Parse and store a price. Invalid input leaves the previous value in place.
    pub fn set_price(&mut self, product_id: &str, raw: &str) -> Result<f64> {
        let slot = self
            .prices
            .get_mut(product_id)
            .ok_or_else(|| ProcurementError::ProductNotFound(product_id.to_string()))?;

        let parsed = raw
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or_else(|| ProcurementError::InvalidPrice {
                item: product_id.to_string(),
                value: raw.to_string(),
            })?;

        *slot = parsed;
        Ok(parsed)
    }

    pub fn set_note(&mut self, note: &str) -> Result<()> {
        check_note(note)?;
        self.note = note.to_string();
        Ok(())
    }

    pub fn price(&self, product_id: &str) -> f64 {
        self.prices.get(product_id).copied().unwrap_or(0.0)
    }

    pub fn line_total(&self, product_id: &str) -> f64 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map_or(0.0, |item| round_cents(self.price(product_id) * f64::from(item.quantity)))
    }

    pub fn total(&self) -> f64 {
        round_cents(
            self.items
                .iter()
                .map(|item| self.price(&item.product_id) * f64::from(item.quantity))
                .sum(),
        )
    }

    pub fn into_response(self, submitted_at: DateTime<Utc>) -> QuotationResponse {
        let prices: Vec<QuotedPrice> = self
            .prices
            .into_iter()
            .map(|(product_id, unit_price)| QuotedPrice { product_id, unit_price })
            .collect();
        let note = Some(self.note).filter(|n| !n.trim().is_empty());
        let fingerprint = QuotationResponse::compute_fingerprint(&prices, note.as_deref());

        QuotationResponse {
            prices,
            note,
            submitted_at,
            fingerprint,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
