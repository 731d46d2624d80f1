// 🔀 Consolidation - answered quotations into supplier orders
//
// For every product quoted with a positive price, the cheapest answer wins.
// Ties go to a homologated supplier, then to the earlier response.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

use crate::entities::{ProductCatalog, SupplierRegistry};
use crate::error::{ProcurementError, Result};
use crate::quotation::{Quotation, QuotationStatus};
use crate::shopping_list::{Availability, LineItem, ShoppingList, SupplierOrder};

/// One supplier's offer for one product
#[derive(Debug, Clone)]
struct Offer<'a> {
    quotation: &'a Quotation,
    product_id: &'a str,
    unit_price: f64,
    quantity: u32,
    homologated: bool,
    submitted_at: DateTime<Utc>,
}

impl Offer<'_> {
    fn beats(&self, other: &Offer<'_>) -> bool {
        if self.unit_price != other.unit_price {
            return self.unit_price < other.unit_price;
        }
        if self.homologated != other.homologated {
            return self.homologated;
        }
        self.submitted_at < other.submitted_at
    }
}

/// Build a pending shopping list from the answered quotations
///
/// Orders appear in the order their supplier first wins a product; items
/// keep the order products were first quoted.
pub fn consolidate<'a, I>(
    id: impl Into<String>,
    quotations: I,
    suppliers: &SupplierRegistry,
    catalog: &ProductCatalog,
    issued_on: NaiveDate,
) -> Result<ShoppingList>
where
    I: IntoIterator<Item = &'a Quotation>,
{
    let mut product_order: Vec<&str> = Vec::new();
    let mut winners: HashMap<&str, Offer<'a>> = HashMap::new();

    for quotation in quotations {
        if quotation.status != QuotationStatus::Answered {
            continue;
        }
        let Some(response) = quotation.response.as_ref() else {
            continue;
        };
        let homologated = suppliers
            .current(&quotation.supplier_id)
            .map(|s| s.homologated)
            .unwrap_or(false);

        for item in &quotation.items {
            let Some(unit_price) = response.price_for(&item.product_id) else {
                continue;
            };
            if unit_price.is_nan() || unit_price <= 0.0 {
                continue;
            }

            let offer = Offer {
                quotation,
                product_id: item.product_id.as_str(),
                unit_price,
                quantity: item.quantity,
                homologated,
                submitted_at: response.submitted_at,
            };

            let replace = match winners.get(offer.product_id) {
                Some(current) => offer.beats(current),
                None => {
                    product_order.push(offer.product_id);
                    true
                }
            };
            if replace {
                winners.insert(offer.product_id, offer);
            }
        }
    }

    if winners.is_empty() {
        return Err(ProcurementError::NothingToConsolidate);
    }

    let mut orders: Vec<SupplierOrder> = Vec::new();
    for product_id in product_order {
        let offer = &winners[product_id];
        let supplier_id = offer.quotation.supplier_id.as_str();

        let index = match orders.iter().position(|o| o.supplier_id == supplier_id) {
            Some(index) => index,
            None => {
                let supplier = suppliers
                    .current(supplier_id)
                    .ok_or_else(|| ProcurementError::SupplierNotFound(supplier_id.to_string()))?;
                orders.push(SupplierOrder::for_supplier(supplier, Vec::new()));
                orders.len() - 1
            }
        };

        orders[index].items.push(line_item(offer, catalog));
    }

    let list = ShoppingList::new(id, issued_on, orders);
    tracing::info!(
        list = %list.id,
        suppliers = list.supplier_count(),
        products = list.product_count(),
        total = list.grand_total(),
        "quotations consolidated"
    );
    Ok(list)
}

fn line_item(offer: &Offer<'_>, catalog: &ProductCatalog) -> LineItem {
    let quoted_name = offer
        .quotation
        .items
        .iter()
        .find(|i| i.product_id == offer.product_id)
        .map(|i| i.name.clone())
        .unwrap_or_default();

    match catalog.find_by_id(offer.product_id) {
        Some(product) => LineItem {
            id: product.id.clone(),
            code: product.code.clone(),
            name: product.name.clone(),
            unit: product.unit.clone(),
            quantity: f64::from(offer.quantity),
            unit_price: offer.unit_price,
            section: product.section,
            category: product.category.clone(),
            availability: Availability::Available,
        },
        None => LineItem {
            id: offer.product_id.to_string(),
            code: offer.product_id.to_string(),
            name: quoted_name,
            unit: "un".to_string(),
            quantity: f64::from(offer.quantity),
            unit_price: offer.unit_price,
            section: None,
            category: String::new(),
            availability: Availability::Available,
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Product, Supplier, SupplierKind};
    use crate::quotation::{QuotationItem, QuotationKind, QuotationResponse, QuotedPrice, ResponseDeadline};
    use crate::shopping_list::ListStatus;
    use chrono::{Duration, TimeZone};

    fn registry() -> SupplierRegistry {
        let mut registry = SupplierRegistry::new();
        registry.register(Supplier::new("Supplier A", SupplierKind::Wholesaler, 100.0).with_id("a").homologated(true));
        registry.register(Supplier::new("Supplier B", SupplierKind::Distributor, 50.0).with_id("b"));
        registry.register(Supplier::new("Supplier C", SupplierKind::Retailer, 0.0).with_id("c").homologated(true));
        registry
    }

    fn catalog() -> ProductCatalog {
        let mut catalog = ProductCatalog::new();
        catalog.register(Product::new("1", "P001", "Arroz Integral", "kg", "Grains", 5.99));
        catalog.register(Product::new("2", "P002", "Feijão Preto", "kg", "Grains", 7.90));
        catalog
    }

    fn answered(supplier: &str, minutes: i64, prices: &[(&str, f64)]) -> Quotation {
        let issued_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let quoted: Vec<QuotedPrice> = prices
            .iter()
            .map(|(id, price)| QuotedPrice { product_id: id.to_string(), unit_price: *price })
            .collect();

        Quotation {
            id: format!("q-{}-{}", supplier, minutes),
            code: "COT-A-001".into(),
            name: "Weekly".into(),
            issued_at,
            supplier_id: supplier.into(),
            supplier_name: format!("Supplier {}", supplier.to_uppercase()),
            deadline: ResponseDeadline::default(),
            items: prices
                .iter()
                .map(|(id, _)| QuotationItem {
                    product_id: id.to_string(),
                    name: format!("Product {}", id),
                    quantity: 10,
                    average_price: 5.0,
                })
                .collect(),
            status: QuotationStatus::Answered,
            kind: QuotationKind::Automatic,
            note: None,
            supplier_url: None,
            response: Some(QuotationResponse {
                fingerprint: QuotationResponse::compute_fingerprint(&quoted, None),
                prices: quoted,
                note: None,
                submitted_at: issued_at + Duration::minutes(minutes),
            }),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn test_lowest_price_wins() {
        let quotations = vec![
            answered("a", 30, &[("1", 6.0), ("2", 7.0)]),
            answered("b", 60, &[("1", 5.5), ("2", 8.0)]),
        ];

        let list = consolidate("7", &quotations, &registry(), &catalog(), date()).unwrap();

        assert_eq!(list.id, "7");
        assert_eq!(list.status, ListStatus::Pending);
        let orders: Vec<(&str, Vec<&str>)> = list
            .orders
            .iter()
            .map(|o| (o.supplier_id.as_str(), o.items.iter().map(|i| i.code.as_str()).collect()))
            .collect();
        assert_eq!(orders, vec![("b", vec!["P001"]), ("a", vec!["P002"])]);
        assert_eq!(list.grand_total(), 125.0);
    }

    #[test]
    fn test_tie_prefers_homologated_then_earlier() {
        let quotations = vec![
            answered("b", 10, &[("1", 5.0)]),
            answered("c", 90, &[("1", 5.0)]),
            answered("a", 30, &[("1", 5.0)]),
        ];

        let list = consolidate("1", &quotations, &registry(), &catalog(), date()).unwrap();
        assert_eq!(list.orders.len(), 1);
        assert_eq!(list.orders[0].supplier_id, "a");
    }

    #[test]
    fn test_ignores_zero_prices_and_unanswered() {
        let mut open = answered("a", 10, &[("1", 1.0)]);
        open.status = QuotationStatus::Open;
        let quotations = vec![open, answered("b", 20, &[("1", 0.0), ("2", 8.0)])];

        let list = consolidate("1", &quotations, &registry(), &catalog(), date()).unwrap();
        assert_eq!(list.product_count(), 1);
        assert_eq!(list.orders[0].items[0].code, "P002");
    }

    #[test]
    fn test_unknown_product_keeps_quoted_name() {
        let quotations = vec![answered("a", 10, &[("99", 2.0)])];

        let list = consolidate("1", &quotations, &registry(), &catalog(), date()).unwrap();
        let item = &list.orders[0].items[0];
        assert_eq!(item.code, "99");
        assert_eq!(item.name, "Product 99");
    }

    #[test]
    fn test_nothing_to_consolidate() {
        let quotations = vec![answered("a", 10, &[("1", 0.0)])];

        let err = consolidate("1", &quotations, &registry(), &catalog(), date()).unwrap_err();
        assert!(matches!(err, ProcurementError::NothingToConsolidate));
    }

    #[test]
    fn test_unknown_supplier_is_error() {
        let quotations = vec![answered("z", 10, &[("1", 2.0)])];

        let err = consolidate("1", &quotations, &registry(), &catalog(), date()).unwrap_err();
        assert!(matches!(err, ProcurementError::SupplierNotFound(_)));
    }
}
