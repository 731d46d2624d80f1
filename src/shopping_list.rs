// 🛒 Shopping Lists - consolidated multi-supplier purchase orders
//
// Totals are always derived from line items:
//   line total  = quantity × unit price
//   order total = Σ line totals
//   grand total = Σ order totals
// Nothing stores a total, so nothing can drift from its items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::{Section, Supplier, SupplierKind};
use crate::error::{ProcurementError, Result};
use crate::round_cents;

// ============================================================================
// LINE ITEM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::Unavailable => "Unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,

    #[serde(default)]
    pub category: String,

    pub availability: Availability,
}

impl LineItem {
    pub fn total(&self) -> f64 {
        round_cents(self.quantity * self.unit_price)
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}

/// Changes from the "edit product" dialog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemEdit {
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub section: Option<Section>,

    /// Remove the section instead of setting one
    #[serde(default)]
    pub clear_section: bool,
}

// ============================================================================
// SUPPLIER ORDER
// ============================================================================

/// The part of a shopping list bought from one supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOrder {
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_kind: SupplierKind,
    pub location: String,
    pub minimum_order: f64,
    pub homologated: bool,
    pub items: Vec<LineItem>,

    /// Checked out on its own
    #[serde(default)]
    pub purchased: bool,
}

impl SupplierOrder {
    pub fn for_supplier(supplier: &Supplier, items: Vec<LineItem>) -> Self {
        SupplierOrder {
            supplier_id: supplier.id.clone(),
            supplier_name: supplier.name.clone(),
            supplier_kind: supplier.kind,
            location: supplier.location(),
            minimum_order: supplier.minimum_order,
            homologated: supplier.homologated,
            items,
            purchased: false,
        }
    }

    pub fn total(&self) -> f64 {
        round_cents(self.items.iter().map(LineItem::total).sum())
    }

    /// Amount still missing to reach the supplier minimum
    pub fn shortfall(&self) -> Option<f64> {
        let total = self.total();
        (total < self.minimum_order).then(|| round_cents(self.minimum_order - total))
    }

    pub fn meets_minimum(&self) -> bool {
        self.shortfall().is_none()
    }

    fn item_mut(&mut self, item_id: &str) -> Result<&mut LineItem> {
        let supplier = self.supplier_id.clone();
        self.items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| ProcurementError::LineItemNotFound {
                supplier,
                item: item_id.to_string(),
            })
    }
}

// ============================================================================
// SHOPPING LIST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Pending,
    Finalized,
    Cancelled,
}

impl ListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListStatus::Pending => "Pending",
            ListStatus::Finalized => "Finalized",
            ListStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSummary {
    pub supplier_count: usize,
    pub product_count: usize,
    pub grand_total: f64,
}

/// Item entering stock when a purchase is finalized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockEntry {
    pub supplier_name: String,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    pub list_id: String,
    pub summary: ListSummary,
    pub stock_entries: Vec<StockEntry>,
}

/// Quantities and prices must be finite and non-negative
fn check_quantity(item_id: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProcurementError::InvalidQuantity {
            item: item_id.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_price(item_id: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProcurementError::InvalidPrice {
            item: item_id.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: String,
    pub issued_on: NaiveDate,

    /// Display order is the purchase route
    pub orders: Vec<SupplierOrder>,

    pub status: ListStatus,
}

impl ShoppingList {
    pub fn new(id: impl Into<String>, issued_on: NaiveDate, orders: Vec<SupplierOrder>) -> Self {
        ShoppingList {
            id: id.into(),
            issued_on,
            orders,
            status: ListStatus::Pending,
        }
    }

    pub fn grand_total(&self) -> f64 {
        round_cents(self.orders.iter().map(SupplierOrder::total).sum())
    }

    /// Line items across all suppliers
    pub fn product_count(&self) -> usize {
        self.orders.iter().map(|o| o.items.len()).sum()
    }

    pub fn supplier_count(&self) -> usize {
        self.orders.len()
    }

    pub fn order(&self, supplier_id: &str) -> Option<&SupplierOrder> {
        self.orders.iter().find(|o| o.supplier_id == supplier_id)
    }

    fn order_index(&self, supplier_id: &str) -> Result<usize> {
        self.orders
            .iter()
            .position(|o| o.supplier_id == supplier_id)
            .ok_or_else(|| ProcurementError::SupplierNotInList {
                list: self.id.clone(),
                supplier: supplier_id.to_string(),
            })
    }

    /// Case-insensitive match on supplier or product names; blank matches all
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.orders.iter().any(|order| {
            order.supplier_name.to_lowercase().contains(&term)
                || order
                    .items
                    .iter()
                    .any(|item| item.name.to_lowercase().contains(&term))
        })
    }

    /// Drag-and-drop: move `active_id` to the position `over_id` holds
    ///
    /// Returns false (and changes nothing) when the ids are equal or either
    /// is not in the list.
    pub fn reorder(&mut self, active_id: &str, over_id: &str) -> bool {
        if active_id == over_id {
            return false;
        }
        let (Some(old_index), Some(new_index)) = (
            self.orders.iter().position(|o| o.supplier_id == active_id),
            self.orders.iter().position(|o| o.supplier_id == over_id),
        ) else {
            return false;
        };

        let moved = self.orders.remove(old_index);
        self.orders.insert(new_index, moved);
        tracing::debug!(list = %self.id, supplier = active_id, from = old_index, to = new_index, "supplier reordered");
        true
    }

    /// One-step keyboard move; no-op at the edges
    pub fn move_supplier(&mut self, supplier_id: &str, direction: MoveDirection) -> bool {
        let Some(index) = self.orders.iter().position(|o| o.supplier_id == supplier_id) else {
            return false;
        };
        let neighbour = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.orders.len() => index + 1,
            _ => return false,
        };
        let over_id = self.orders[neighbour].supplier_id.clone();
        self.reorder(supplier_id, &over_id)
    }

    fn ensure_pending(&self) -> Result<()> {
        match self.status {
            ListStatus::Pending => Ok(()),
            ListStatus::Finalized => Err(ProcurementError::AlreadyFinalized(self.id.clone())),
            ListStatus::Cancelled => Err(ProcurementError::ListCancelled(self.id.clone())),
        }
    }

    /// Index of an order that can still change
    fn open_order_index(&self, supplier_id: &str) -> Result<usize> {
        let index = self.order_index(supplier_id)?;
        if self.orders[index].purchased {
            return Err(ProcurementError::OrderPurchased {
                list: self.id.clone(),
                supplier: supplier_id.to_string(),
            });
        }
        Ok(index)
    }

    pub fn edit_item(&mut self, supplier_id: &str, item_id: &str, edit: &ItemEdit) -> Result<&LineItem> {
        self.ensure_pending()?;
        if let Some(quantity) = edit.quantity {
            check_quantity(item_id, quantity)?;
        }
        if let Some(unit_price) = edit.unit_price {
            check_price(item_id, unit_price)?;
        }

        let index = self.open_order_index(supplier_id)?;
        let item = self.orders[index].item_mut(item_id)?;

        if let Some(quantity) = edit.quantity {
            item.quantity = quantity;
        }
        if let Some(unit_price) = edit.unit_price {
            item.unit_price = unit_price;
        }
        if edit.clear_section {
            item.section = None;
        } else if let Some(section) = edit.section {
            item.section = Some(section);
        }

        tracing::debug!(item = %item.code, total = item.total(), "line item edited");
        Ok(item)
    }

    pub fn add_item(&mut self, supplier_id: &str, item: LineItem) -> Result<()> {
        self.ensure_pending()?;
        check_quantity(&item.id, item.quantity)?;
        check_price(&item.id, item.unit_price)?;

        let index = self.open_order_index(supplier_id)?;
        self.orders[index].items.push(item);
        Ok(())
    }

    /// Preview shown before confirming a purchase
    pub fn summary(&self) -> ListSummary {
        ListSummary {
            supplier_count: self.supplier_count(),
            product_count: self.product_count(),
            grand_total: self.grand_total(),
        }
    }

    fn receipt_for<'a>(&self, orders: impl Iterator<Item = &'a SupplierOrder>) -> PurchaseReceipt {
        let orders: Vec<&SupplierOrder> = orders.collect();
        let stock_entries = orders
            .iter()
            .flat_map(|order| {
                order.items.iter().map(|item| StockEntry {
                    supplier_name: order.supplier_name.clone(),
                    code: item.code.clone(),
                    name: item.name.clone(),
                    unit: item.unit.clone(),
                    quantity: item.quantity,
                })
            })
            .collect();

        PurchaseReceipt {
            list_id: self.id.clone(),
            summary: ListSummary {
                supplier_count: orders.len(),
                product_count: orders.iter().map(|o| o.items.len()).sum(),
                grand_total: round_cents(orders.iter().map(|o| o.total()).sum()),
            },
            stock_entries,
        }
    }

    /// Check out a single supplier; the order must reach the supplier minimum
    pub fn finalize_supplier(&mut self, supplier_id: &str) -> Result<PurchaseReceipt> {
        self.ensure_pending()?;
        let index = self.order_index(supplier_id)?;

        let order = &self.orders[index];
        if order.purchased {
            return Ok(self.receipt_for(std::iter::once(order)));
        }
        if !order.meets_minimum() {
            return Err(ProcurementError::BelowMinimumOrder {
                supplier: order.supplier_name.clone(),
                total: order.total(),
                minimum: order.minimum_order,
            });
        }

        let receipt = self.receipt_for(std::iter::once(order));
        self.orders[index].purchased = true;

        if self.orders.iter().all(|o| o.purchased) {
            self.status = ListStatus::Finalized;
        }

        tracing::info!(
            list = %self.id,
            supplier = %self.orders[index].supplier_name,
            total = receipt.summary.grand_total,
            "supplier order finalized"
        );
        Ok(receipt)
    }

    /// Finalize every remaining purchase and register the items in stock
    pub fn finalize(&mut self) -> Result<PurchaseReceipt> {
        self.ensure_pending()?;

        let receipt = self.receipt_for(self.orders.iter().filter(|o| !o.purchased));
        for order in &mut self.orders {
            order.purchased = true;
        }
        self.status = ListStatus::Finalized;

        tracing::info!(
            list = %self.id,
            suppliers = receipt.summary.supplier_count,
            total = receipt.summary.grand_total,
            "shopping list finalized"
        );
        Ok(receipt)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_pending()?;
        self.status = ListStatus::Cancelled;
        tracing::info!(list = %self.id, "shopping list cancelled");
        Ok(())
    }
}

// ============================================================================
// BOOK
// ============================================================================

/// Status tab on the shopping-list page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListTab {
    #[default]
    Pending,
    Finalized,

    /// Every status, cancelled included
    All,
}

impl ListTab {
    pub fn matches(&self, status: ListStatus) -> bool {
        match self {
            ListTab::Pending => status == ListStatus::Pending,
            ListTab::Finalized => status == ListStatus::Finalized,
            ListTab::All => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListTab::Pending => "Pending",
            ListTab::Finalized => "Finalized",
            ListTab::All => "All",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendentes" => Some(ListTab::Pending),
            "finalized" | "finalizadas" => Some(ListTab::Finalized),
            "all" | "todas" => Some(ListTab::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub tab: ListTab,
    pub term: String,
}

impl ListFilter {
    pub fn matches(&self, list: &ShoppingList) -> bool {
        self.tab.matches(list.status) && list.matches(&self.term)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShoppingListBook {
    lists: Vec<ShoppingList>,
}

impl ShoppingListBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, list: ShoppingList) {
        self.lists.push(list);
    }

    /// Next numeric id ("1", "2", ...)
    pub fn next_id(&self) -> String {
        let highest = self
            .lists
            .iter()
            .filter_map(|l| l.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (highest + 1).to_string()
    }

    pub fn get(&self, id: &str) -> Result<&ShoppingList> {
        self.lists
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| ProcurementError::ListNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut ShoppingList> {
        self.lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| ProcurementError::ListNotFound(id.to_string()))
    }

    /// Lists passing the tab and search term, newest first
    pub fn search(&self, filter: &ListFilter) -> Vec<&ShoppingList> {
        let mut found: Vec<&ShoppingList> = self.lists.iter().filter(|l| filter.matches(l)).collect();
        found.sort_by(|a, b| b.issued_on.cmp(&a.issued_on).then_with(|| a.id.cmp(&b.id)));
        found
    }

    pub fn all(&self) -> &[ShoppingList] {
        &self.lists
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, quantity: f64, unit_price: f64) -> LineItem {
        LineItem {
            id: id.to_string(),
            code: format!("P00{}", id),
            name: name.to_string(),
            unit: "kg".to_string(),
            quantity,
            unit_price,
            section: None,
            category: "Grains".to_string(),
            availability: Availability::Available,
        }
    }

    fn order(id: &str, name: &str, minimum: f64, items: Vec<LineItem>) -> SupplierOrder {
        let supplier = Supplier::new(name, SupplierKind::Wholesaler, minimum)
            .with_id(id)
            .with_location("Centro", "São Paulo", "SP");
        SupplierOrder::for_supplier(&supplier, items)
    }

    fn list() -> ShoppingList {
        ShoppingList::new(
            "1",
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
            vec![
                order(
                    "s1",
                    "Atacadão Distribuidor",
                    200.0,
                    vec![
                        item("1", "Arroz Integral", 10.0, 5.99),
                        item("2", "Feijão Preto", 5.0, 7.90),
                        item("4", "Açúcar Refinado", 8.0, 3.99),
                    ],
                ),
                order(
                    "s2",
                    "Distribuidora Alimentos Brasil",
                    150.0,
                    vec![item("3", "Leite Integral", 20.0, 4.50), item("5", "Café Torrado", 4.0, 29.90)],
                ),
                order("s3", "Atacado Popular", 300.0, vec![item("1", "Arroz Integral", 10.0, 5.99)]),
            ],
        )
    }

    fn ids(list: &ShoppingList) -> Vec<&str> {
        list.orders.iter().map(|o| o.supplier_id.as_str()).collect()
    }

    #[test]
    fn test_totals_are_sums_of_items() {
        let list = list();

        assert_eq!(list.orders[0].items[0].total(), 59.90);
        assert_eq!(list.orders[0].total(), 131.32);
        assert_eq!(list.orders[1].total(), 209.60);
        assert_eq!(list.grand_total(), 400.82);
        assert_eq!(list.product_count(), 6);
        assert_eq!(list.supplier_count(), 3);
    }

    #[test]
    fn test_minimum_order_shortfall() {
        let list = list();

        assert_eq!(list.orders[0].shortfall(), Some(68.68));
        assert!(!list.orders[0].meets_minimum());
        assert_eq!(list.orders[1].shortfall(), None);
        assert!(list.orders[1].meets_minimum());
    }

    #[test]
    fn test_search_matches_supplier_or_product() {
        let list = list();

        assert!(list.matches("popular"));
        assert!(list.matches("CAFÉ"));
        assert!(list.matches(""));
        assert!(list.matches("   "));
        assert!(!list.matches("detergente"));
    }

    #[test]
    fn test_reorder_moves_to_over_position() {
        let mut list = list();

        assert!(list.reorder("s1", "s3"));
        assert_eq!(ids(&list), vec!["s2", "s3", "s1"]);

        assert!(list.reorder("s1", "s2"));
        assert_eq!(ids(&list), vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_reorder_noop_cases() {
        let mut list = list();

        assert!(!list.reorder("s2", "s2"));
        assert!(!list.reorder("s2", "missing"));
        assert!(!list.reorder("missing", "s1"));
        assert_eq!(ids(&list), vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_move_supplier() {
        let mut list = list();

        assert!(!list.move_supplier("s1", MoveDirection::Up));
        assert!(list.move_supplier("s1", MoveDirection::Down));
        assert_eq!(ids(&list), vec!["s2", "s1", "s3"]);
        assert!(list.move_supplier("s3", MoveDirection::Up));
        assert_eq!(ids(&list), vec!["s2", "s3", "s1"]);
        assert!(!list.move_supplier("s1", MoveDirection::Down));
    }

    #[test]
    fn test_edit_item_recomputes_totals() {
        let mut list = list();
        let edit = ItemEdit {
            quantity: Some(20.0),
            section: Some(Section::Grocery),
            ..Default::default()
        };

        let item = list.edit_item("s1", "1", &edit).unwrap();
        assert_eq!(item.total(), 119.80);
        assert_eq!(item.section, Some(Section::Grocery));
        assert_eq!(list.orders[0].total(), 191.22);

        let clear = ItemEdit {
            clear_section: true,
            ..Default::default()
        };
        assert_eq!(list.edit_item("s1", "1", &clear).unwrap().section, None);
    }

    #[test]
    fn test_edit_item_rejects_bad_values() {
        let mut list = list();

        let negative = ItemEdit {
            unit_price: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            list.edit_item("s1", "1", &negative),
            Err(ProcurementError::InvalidPrice { .. })
        ));

        let nan = ItemEdit {
            quantity: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            list.edit_item("s1", "1", &nan),
            Err(ProcurementError::InvalidQuantity { .. })
        ));

        assert!(matches!(
            list.edit_item("s9", "1", &ItemEdit::default()),
            Err(ProcurementError::SupplierNotInList { .. })
        ));
        assert!(matches!(
            list.edit_item("s1", "99", &ItemEdit::default()),
            Err(ProcurementError::LineItemNotFound { .. })
        ));

        assert_eq!(list.orders[0].items[0].unit_price, 5.99);
    }

    #[test]
    fn test_finalize_supplier_requires_minimum() {
        let mut list = list();

        let err = list.finalize_supplier("s1").unwrap_err();
        assert!(matches!(err, ProcurementError::BelowMinimumOrder { .. }));
        assert!(!list.orders[0].purchased);

        let receipt = list.finalize_supplier("s2").unwrap();
        assert_eq!(receipt.summary.supplier_count, 1);
        assert_eq!(receipt.summary.grand_total, 209.60);
        assert_eq!(receipt.stock_entries.len(), 2);
        assert!(list.orders[1].purchased);
        assert_eq!(list.status, ListStatus::Pending);
    }

    #[test]
    fn test_last_supplier_finalizes_list() {
        let mut list = list();
        list.orders.retain(|o| o.supplier_id == "s2");

        list.finalize_supplier("s2").unwrap();
        assert_eq!(list.status, ListStatus::Finalized);
    }

    #[test]
    fn test_finalize_all() {
        let mut list = list();
        list.finalize_supplier("s2").unwrap();

        let receipt = list.finalize().unwrap();
        // s2 was already checked out
        assert_eq!(receipt.summary.supplier_count, 2);
        assert_eq!(receipt.stock_entries.len(), 4);
        assert_eq!(receipt.summary.grand_total, 191.22);
        assert_eq!(list.status, ListStatus::Finalized);
        assert!(list.orders.iter().all(|o| o.purchased));

        assert!(matches!(list.finalize(), Err(ProcurementError::AlreadyFinalized(_))));
        assert!(matches!(
            list.edit_item("s1", "1", &ItemEdit::default()),
            Err(ProcurementError::AlreadyFinalized(_))
        ));
    }

    #[test]
    fn test_cancelled_list_cannot_finalize() {
        let mut list = list();
        list.cancel().unwrap();

        assert!(matches!(list.finalize(), Err(ProcurementError::ListCancelled(_))));
        assert!(list.cancel().is_err());
    }

    #[test]
    fn test_add_item() {
        let mut list = list();
        list.add_item("s3", item("3", "Leite Integral", 40.0, 4.50)).unwrap();

        assert_eq!(list.orders[2].total(), 239.90);
        assert!(list.add_item("s3", item("6", "x", -1.0, 1.0)).is_err());

        assert!(matches!(
            list.add_item("s3", item("7", "Negative", 1.0, -50.0)),
            Err(ProcurementError::InvalidPrice { .. })
        ));
        assert!(matches!(
            list.add_item("s3", item("8", "NaN", 1.0, f64::NAN)),
            Err(ProcurementError::InvalidPrice { .. })
        ));
        assert!(matches!(
            list.add_item("s3", item("9", "Infinite", 1.0, f64::INFINITY)),
            Err(ProcurementError::InvalidPrice { .. })
        ));
        assert_eq!(list.orders[2].items.len(), 2);
        assert_eq!(list.orders[2].total(), 239.90);
        assert!(list.grand_total().is_finite());
    }

    #[test]
    fn test_purchased_order_is_frozen() {
        let mut list = list();
        list.finalize_supplier("s2").unwrap();
        let before = list.orders[1].total();

        let edit = ItemEdit {
            quantity: Some(1.0),
            ..Default::default()
        };
        let item_id = list.orders[1].items[0].id.clone();
        assert!(matches!(
            list.edit_item("s2", &item_id, &edit),
            Err(ProcurementError::OrderPurchased { .. })
        ));
        assert!(matches!(
            list.add_item("s2", item("3", "Leite Integral", 1.0, 4.50)),
            Err(ProcurementError::OrderPurchased { .. })
        ));
        assert_eq!(list.orders[1].total(), before);

        // other orders stay editable
        assert!(list.edit_item("s1", "1", &edit).is_ok());
    }

    #[test]
    fn test_summary_previews_purchase() {
        let list = list();
        let summary = list.summary();

        assert_eq!(summary.supplier_count, 3);
        assert_eq!(summary.product_count, 6);
        assert_eq!(summary.grand_total, 400.82);
        assert_eq!(list.status, ListStatus::Pending);
    }

    #[test]
    fn test_book_search_by_tab_and_term() {
        let mut book = ShoppingListBook::new();
        book.insert(list());

        let mut finalized = list();
        finalized.id = "2".into();
        finalized.issued_on = NaiveDate::from_ymd_opt(2023, 3, 10).unwrap();
        finalized.orders.truncate(1);
        finalized.finalize().unwrap();
        book.insert(finalized);

        let mut cancelled = list();
        cancelled.id = "3".into();
        cancelled.issued_on = NaiveDate::from_ymd_opt(2023, 3, 5).unwrap();
        cancelled.cancel().unwrap();
        book.insert(cancelled);

        let pending = book.search(&ListFilter::default());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "1");

        let all = book.search(&ListFilter { tab: ListTab::All, term: String::new() });
        let all_ids: Vec<&str> = all.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(all_ids, vec!["1", "2", "3"]);

        let coffee = book.search(&ListFilter { tab: ListTab::All, term: "café".into() });
        let coffee_ids: Vec<&str> = coffee.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(coffee_ids, vec!["1", "3"]);

        assert_eq!(book.next_id(), "4");
        assert!(book.get("9").is_err());
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!(ListTab::parse("todas"), Some(ListTab::All));
        assert_eq!(ListTab::parse("Finalized"), Some(ListTab::Finalized));
        assert_eq!(ListTab::parse("x"), None);
    }
}
