// 📊 Quotation statistics - the figures shown above the quotation page

use chrono::Duration;
use serde::Serialize;
use std::collections::HashMap;

use crate::quotation::{format_span, Quotation, QuotationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseRateBand {
    Good,
    Fair,
    Poor,
}

impl ResponseRateBand {
    /// ≥ 90 good, ≥ 50 fair, otherwise poor
    pub fn for_rate(rate: f64) -> Self {
        if rate >= 90.0 {
            ResponseRateBand::Good
        } else if rate >= 50.0 {
            ResponseRateBand::Fair
        } else {
            ResponseRateBand::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierResponseTime {
    pub supplier_id: String,
    pub supplier_name: String,
    pub average_minutes: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierScore {
    pub supplier_id: String,
    pub supplier_name: String,

    /// Answered / sent, 0-100
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationStats {
    pub total: usize,
    pub answered: usize,

    /// Percent of quotations answered
    pub response_rate: f64,
    pub response_rate_band: ResponseRateBand,

    /// Lowest answered response total
    pub best_price: Option<f64>,

    pub fastest_suppliers: Vec<SupplierResponseTime>,
    pub top_performers: Vec<SupplierScore>,
}

/// Per-supplier counters, keyed by supplier id
#[derive(Default)]
struct Tally<'a> {
    name: &'a str,
    sent: usize,
    answered: usize,
    response_minutes: i64,
}

impl QuotationStats {
    pub fn compute<'a, I>(quotations: I) -> Self
    where
        I: IntoIterator<Item = &'a Quotation>,
    {
        let mut total = 0;
        let mut answered = 0;
        let mut best_price: Option<f64> = None;

        let mut per_supplier: HashMap<&str, Tally> = HashMap::new();

        for quotation in quotations {
            total += 1;
            let entry = per_supplier
                .entry(quotation.supplier_id.as_str())
                .or_default();
            entry.name = quotation.supplier_name.as_str();
            entry.sent += 1;

            if quotation.status != QuotationStatus::Answered {
                continue;
            }
            answered += 1;
            entry.answered += 1;
            if let Some(elapsed) = quotation.response_time() {
                entry.response_minutes += elapsed.num_minutes().max(0);
            }
            if let Some(price) = quotation.response_total() {
                best_price = Some(best_price.map_or(price, |best| best.min(price)));
            }
        }

        let response_rate = if total == 0 {
            0.0
        } else {
            ((answered as f64 / total as f64) * 1000.0).round() / 10.0
        };

        let mut fastest_suppliers: Vec<SupplierResponseTime> = per_supplier
            .iter()
            .filter(|(_, tally)| tally.answered > 0)
            .map(|(id, tally)| {
                let average_minutes = tally.response_minutes / tally.answered as i64;
                SupplierResponseTime {
                    supplier_id: id.to_string(),
                    supplier_name: tally.name.to_string(),
                    average_minutes,
                    label: format_span(Duration::minutes(average_minutes)),
                }
            })
            .collect();
        fastest_suppliers.sort_by(|a, b| {
            a.average_minutes
                .cmp(&b.average_minutes)
                .then_with(|| a.supplier_name.cmp(&b.supplier_name))
                .then_with(|| a.supplier_id.cmp(&b.supplier_id))
        });

        let mut top_performers: Vec<SupplierScore> = per_supplier
            .iter()
            .map(|(id, tally)| SupplierScore {
                supplier_id: id.to_string(),
                supplier_name: tally.name.to_string(),
                score: ((tally.answered as f64 / tally.sent as f64) * 100.0).round() as u8,
            })
            .collect();
        top_performers.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.supplier_name.cmp(&b.supplier_name))
                .then_with(|| a.supplier_id.cmp(&b.supplier_id))
        });

        QuotationStats {
            total,
            answered,
            response_rate,
            response_rate_band: ResponseRateBand::for_rate(response_rate),
            best_price,
            fastest_suppliers,
            top_performers,
        }
    }
}
