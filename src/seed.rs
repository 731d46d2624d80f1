// 🌱 Seed Data - the demo data set and its JSON file form
//
// Quotation timestamps are relative to `now` so the demo always has open,
// answered and unanswered quotations no matter when it is loaded.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::entities::{Product, Section, Supplier, SupplierKind};
use crate::error::Result;
use crate::quotation::{
    Quotation, QuotationItem, QuotationKind, QuotationResponse, QuotationStatus, QuotedPrice,
    ResponseDeadline,
};
use crate::round_cents;
use crate::shopping_list::{Availability, LineItem, ListStatus, ShoppingList, SupplierOrder};

/// Everything a workspace starts from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub quotations: Vec<Quotation>,
    #[serde(default)]
    pub shopping_lists: Vec<ShoppingList>,
}

impl SeedData {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let seed: SeedData = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            suppliers = seed.suppliers.len(),
            products = seed.products.len(),
            quotations = seed.quotations.len(),
            lists = seed.shopping_lists.len(),
            "seed file loaded"
        );
        Ok(seed)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

// ============================================================================
// DEMO DATA
// ============================================================================

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn products() -> Vec<Product> {
    vec![
        Product::new("1", "P001", "Arroz Integral", "kg", "Grains", 5.99).in_section(Section::Grocery),
        Product::new("2", "P002", "Feijão Preto", "kg", "Grains", 7.90).in_section(Section::Grocery),
        Product::new("3", "P003", "Leite Integral", "L", "Dairy", 4.50).in_section(Section::Dairy),
        Product::new("4", "P004", "Açúcar Refinado", "kg", "Staples", 3.99).in_section(Section::Grocery),
        Product::new("5", "P005", "Café Torrado", "kg", "Beverages", 29.90),
        Product::new("6", "P006", "Product A", "un", "General", 10.50),
        Product::new("7", "P007", "Product B", "un", "General", 25.00),
        Product::new("8", "P008", "Product C", "un", "General", 15.75),
    ]
}

fn suppliers() -> Vec<Supplier> {
    vec![
        Supplier::new("Atacadão Distribuidor", SupplierKind::Wholesaler, 200.0)
            .with_id("1")
            .with_location("Centro", "São Paulo", "SP")
            .homologated(true),
        Supplier::new("Distribuidora Alimentos Brasil", SupplierKind::Wholesaler, 150.0)
            .with_id("2")
            .with_location("Pinheiros", "São Paulo", "SP")
            .homologated(true),
        Supplier::new("Atacado Popular", SupplierKind::Wholesaler, 300.0)
            .with_id("3")
            .with_location("Vila Mariana", "São Paulo", "SP"),
        Supplier::new("Supplier A", SupplierKind::Wholesaler, 500.0)
            .with_id("a")
            .with_location("Brás", "São Paulo", "SP")
            .homologated(true)
            .with_website("https://supplier-a.example.com"),
        Supplier::new("Supplier B", SupplierKind::Retailer, 100.0)
            .with_id("b")
            .with_location("Mooca", "São Paulo", "SP")
            .with_website("https://supplier-b.example.com"),
        Supplier::new("Supplier C", SupplierKind::Wholesaler, 250.0)
            .with_id("c")
            .with_location("Lapa", "São Paulo", "SP")
            .homologated(true)
            .with_website("https://supplier-c.example.com"),
    ]
}

fn line_item(product: &Product, quantity: f64) -> LineItem {
    LineItem {
        id: product.id.clone(),
        code: product.code.clone(),
        name: product.name.clone(),
        unit: product.unit.clone(),
        quantity,
        unit_price: product.average_price,
        section: product.section,
        category: product.category.clone(),
        availability: Availability::Available,
    }
}

fn shopping_lists(products: &[Product], suppliers: &[Supplier]) -> Vec<ShoppingList> {
    let item = |index: usize, quantity: f64| line_item(&products[index], quantity);

    let order_1 = || {
        SupplierOrder::for_supplier(&suppliers[0], vec![item(0, 10.0), item(1, 5.0), item(3, 8.0)])
    };
    let order_2 = || SupplierOrder::for_supplier(&suppliers[1], vec![item(2, 20.0), item(4, 4.0)]);
    let order_3 = || SupplierOrder::for_supplier(&suppliers[2], vec![item(0, 10.0), item(2, 20.0)]);

    let pending = ShoppingList::new("1", date(2023, 3, 15), vec![order_1(), order_2()]);

    let mut finalized = ShoppingList::new("2", date(2023, 3, 10), vec![order_3()]);
    finalized.status = ListStatus::Finalized;
    for order in &mut finalized.orders {
        order.purchased = true;
    }

    let mut cancelled = ShoppingList::new("3", date(2023, 3, 5), vec![order_1(), order_2(), order_3()]);
    cancelled.status = ListStatus::Cancelled;

    vec![pending, finalized, cancelled]
}

/// Per-index layout of the six demo quotations of each kind
const QUOTATION_PLAN: [(QuotationStatus, i64, bool); 6] = [
    // (status, hours since issue, has deadline)
    (QuotationStatus::Open, 2, true),
    (QuotationStatus::Answered, 20, true),
    (QuotationStatus::Unanswered, 30, true),
    (QuotationStatus::Answered, 44, false),
    (QuotationStatus::Open, 6, false),
    (QuotationStatus::Answered, 70, true),
];

fn quotations(kind: QuotationKind, products: &[Product], suppliers: &[Supplier], now: DateTime<Utc>) -> Vec<Quotation> {
    let catalogue_suppliers = &suppliers[3..];
    let quoted_products = &products[5..];
    // Supplier A undercuts the reference price, B charges above it
    let price_factors = [0.95, 1.05, 0.90];
    let quantities = [100, 50, 75];

    QUOTATION_PLAN
        .iter()
        .enumerate()
        .map(|(i, (status, age_hours, has_deadline))| {
            let supplier_index = (i + kind as usize) % catalogue_suppliers.len();
            let supplier = &catalogue_suppliers[supplier_index];
            let issued_at = now - Duration::hours(*age_hours);
            let item_count = i % quoted_products.len() + 1;

            let items: Vec<QuotationItem> = quoted_products
                .iter()
                .zip(quantities)
                .take(item_count)
                .map(|(product, quantity)| QuotationItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    quantity,
                    average_price: product.average_price,
                })
                .collect();

            let response = (*status == QuotationStatus::Answered).then(|| {
                let prices: Vec<QuotedPrice> = items
                    .iter()
                    .map(|item| QuotedPrice {
                        product_id: item.product_id.clone(),
                        unit_price: round_cents(item.average_price * price_factors[supplier_index]),
                    })
                    .collect();
                QuotationResponse {
                    fingerprint: QuotationResponse::compute_fingerprint(&prices, None),
                    prices,
                    note: None,
                    submitted_at: issued_at + Duration::minutes(30 + 40 * i as i64),
                }
            });

            let prefix = kind.as_str().to_lowercase();
            Quotation {
                id: format!("{}-{}", prefix, i + 1),
                code: format!("COT-{}-{:03}", kind.code_letter(), i + 1),
                name: format!("{} quotation {}", kind.as_str(), i + 1),
                issued_at,
                supplier_id: supplier.id.clone(),
                supplier_name: supplier.name.clone(),
                deadline: if *has_deadline {
                    ResponseDeadline::Hours(24)
                } else {
                    ResponseDeadline::NoDeadline
                },
                items,
                status: *status,
                kind,
                note: None,
                supplier_url: match kind {
                    QuotationKind::Manual => supplier.website.clone(),
                    QuotationKind::Automatic => None,
                },
                response,
            }
        })
        .collect()
}

/// Built-in demo data
pub fn demo(now: DateTime<Utc>) -> SeedData {
    let products = products();
    let suppliers = suppliers();

    let mut all_quotations = quotations(QuotationKind::Automatic, &products, &suppliers, now);
    all_quotations.extend(quotations(QuotationKind::Manual, &products, &suppliers, now));

    SeedData {
        shopping_lists: shopping_lists(&products, &suppliers),
        quotations: all_quotations,
        suppliers,
        products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_lists_match_reference_totals() {
        let seed = demo(Utc::now());
        let totals: Vec<(String, f64, ListStatus)> = seed
            .shopping_lists
            .iter()
            .map(|l| (l.id.clone(), l.grand_total(), l.status))
            .collect();

        assert_eq!(
            totals,
            vec![
                ("1".to_string(), 340.92, ListStatus::Pending),
                ("2".to_string(), 149.90, ListStatus::Finalized),
                ("3".to_string(), 490.82, ListStatus::Cancelled),
            ]
        );
    }

    #[test]
    fn test_demo_quotations() {
        let now = Utc::now();
        let seed = demo(now);

        assert_eq!(seed.quotations.len(), 12);
        let codes: Vec<&str> = seed.quotations.iter().map(|q| q.code.as_str()).collect();
        assert!(codes.contains(&"COT-A-006"));
        assert!(codes.contains(&"COT-M-001"));

        for quotation in &seed.quotations {
            assert_eq!(quotation.response.is_some(), quotation.status == QuotationStatus::Answered);
            // open demo quotations are never already overdue
            assert!(!quotation.is_overdue(now));
        }
        assert!(seed
            .quotations
            .iter()
            .filter(|q| q.kind == QuotationKind::Manual)
            .all(|q| q.supplier_url.is_some()));
    }

    #[test]
    fn test_seed_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");

        let seed = demo(Utc::now());
        seed.save(&path).unwrap();
        let loaded = SeedData::load(&path).unwrap();

        assert_eq!(loaded.suppliers.len(), 6);
        assert_eq!(loaded.products.len(), 8);
        assert_eq!(loaded.shopping_lists, seed.shopping_lists);
    }

    #[test]
    fn test_minimal_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{"suppliers":[{"id":"x","name":"Only","kind":"retailer"}]}"#).unwrap();

        let loaded = SeedData::load(&path).unwrap();
        assert_eq!(loaded.suppliers[0].version, 1);
        assert!(loaded.quotations.is_empty());
    }
}
