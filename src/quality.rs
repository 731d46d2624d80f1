// ✅ List Quality - checks run on a shopping list before purchasing
//
// Each rule yields findings with a severity and a recommendation.
// Orders below their supplier minimum block per-supplier checkout.

use serde::{Deserialize, Serialize};

use crate::shopping_list::{ShoppingList, SupplierOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical, // Purchase cannot go ahead as is
    Warning,  // Purchase is questionable
    Info,     // Worth a look
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub rule: String,
    pub supplier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,

    pub issue: String,
    pub recommendation: String,
}

impl Finding {
    fn new(severity: Severity, rule: &str, order: &SupplierOrder, issue: String, recommendation: &str) -> Self {
        Finding {
            severity,
            rule: rule.to_string(),
            supplier: order.supplier_name.clone(),
            item: None,
            issue,
            recommendation: recommendation.to_string(),
        }
    }

    fn for_item(mut self, code: &str) -> Self {
        self.item = Some(code.to_string());
        self
    }
}

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub list_id: String,

    /// Most severe first
    pub findings: Vec<Finding>,

    /// Suppliers whose order is below the minimum
    pub blocked_suppliers: Vec<String>,
}

impl QualityReport {
    pub fn summary(&self) -> String {
        format!(
            "List #{}: {} findings ({} critical, {} warnings), {} supplier(s) below minimum",
            self.list_id,
            self.findings.len(),
            self.count(Severity::Critical),
            self.count(Severity::Warning),
            self.blocked_suppliers.len()
        )
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Critical)
    }

    pub fn is_clean(&self) -> bool {
        self.findings.iter().all(|f| f.severity == Severity::Info)
    }

    /// Suppliers with at least one critical finding, first seen first
    pub fn critical_suppliers(&self) -> Vec<&str> {
        let mut suppliers: Vec<&str> = Vec::new();
        for finding in self.findings.iter().filter(|f| f.severity == Severity::Critical) {
            if !suppliers.contains(&finding.supplier.as_str()) {
                suppliers.push(&finding.supplier);
            }
        }
        suppliers
    }

    /// One-line outcome of the checks
    pub fn verdict(&self) -> String {
        let mut parts = Vec::new();
        if self.has_critical_issues() {
            parts.push(format!("blocked: {}", self.critical_suppliers().join(", ")));
        }
        if !self.blocked_suppliers.is_empty() {
            parts.push(format!("below minimum: {}", self.blocked_suppliers.join(", ")));
        }
        if parts.is_empty() {
            return match self.count(Severity::Warning) {
                0 => "ready to purchase".to_string(),
                n => format!("ready with {} warning(s)", n),
            };
        }
        parts.join("; ")
    }
}

// ============================================================================
// CHECKS
// ============================================================================

/// Run every rule over a shopping list
pub fn check_list(list: &ShoppingList) -> QualityReport {
    let mut findings = Vec::new();
    let mut blocked_suppliers = Vec::new();

    for order in &list.orders {
        // Rule 1: order has items
        if order.items.is_empty() {
            findings.push(Finding::new(
                Severity::Critical,
                "empty_order",
                order,
                "Order has no items".to_string(),
                "Add products or remove the supplier from the list",
            ));
        }

        // Rule 2: supplier minimum
        if let Some(shortfall) = order.shortfall() {
            blocked_suppliers.push(order.supplier_name.clone());
            findings.push(Finding::new(
                Severity::Warning,
                "below_minimum",
                order,
                format!(
                    "Order total {:.2} is {:.2} below the minimum of {:.2}",
                    order.total(),
                    shortfall,
                    order.minimum_order
                ),
                "Increase quantities or move items to this supplier",
            ));
        }

        // Rule 3: homologation
        if !order.homologated {
            findings.push(Finding::new(
                Severity::Info,
                "not_homologated",
                order,
                "Supplier is not homologated".to_string(),
                "Confirm the supplier before purchasing",
            ));
        }

        for item in &order.items {
            // Rule 4: quantity
            if item.quantity <= 0.0 {
                findings.push(
                    Finding::new(
                        Severity::Critical,
                        "zero_quantity",
                        order,
                        format!("{} has no quantity", item.name),
                        "Set a quantity or remove the item",
                    )
                    .for_item(&item.code),
                );
            }

            // Rule 5: availability
            if !item.is_available() {
                findings.push(
                    Finding::new(
                        Severity::Warning,
                        "unavailable_item",
                        order,
                        format!("{} is unavailable at this supplier", item.name),
                        "Buy it from another supplier",
                    )
                    .for_item(&item.code),
                );
            }

            // Rule 6: section
            if item.section.is_none() {
                findings.push(
                    Finding::new(
                        Severity::Info,
                        "missing_section",
                        order,
                        format!("{} has no store section", item.name),
                        "Assign a section to group the pick route",
                    )
                    .for_item(&item.code),
                );
            }
        }
    }

    findings.sort_by_key(|f| f.severity);

    let report = QualityReport {
        list_id: list.id.clone(),
        findings,
        blocked_suppliers,
    };
    tracing::debug!(summary = %report.summary(), "list checked");
    report
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Section, Supplier, SupplierKind};
    use crate::shopping_list::{Availability, LineItem};
    use chrono::NaiveDate;

    fn item(code: &str, quantity: f64, price: f64, section: Option<Section>) -> LineItem {
        LineItem {
            id: code.to_string(),
            code: code.to_string(),
            name: format!("Item {}", code),
            unit: "un".to_string(),
            quantity,
            unit_price: price,
            section,
            category: String::new(),
            availability: Availability::Available,
        }
    }

    fn order(name: &str, minimum: f64, homologated: bool, items: Vec<LineItem>) -> SupplierOrder {
        let supplier = Supplier::new(name, SupplierKind::Wholesaler, minimum).homologated(homologated);
        SupplierOrder::for_supplier(&supplier, items)
    }

    fn list(orders: Vec<SupplierOrder>) -> ShoppingList {
        ShoppingList::new("1", NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(), orders)
    }

    #[test]
    fn test_clean_list() {
        let list = list(vec![order(
            "Good",
            50.0,
            true,
            vec![item("P001", 10.0, 6.0, Some(Section::Grocery))],
        )]);

        let report = check_list(&list);
        assert!(report.findings.is_empty());
        assert!(report.is_clean());
        assert!(!report.has_critical_issues());
        assert!(report.blocked_suppliers.is_empty());
    }

    #[test]
    fn test_below_minimum_blocks_supplier() {
        let list = list(vec![order(
            "Atacado Popular",
            300.0,
            true,
            vec![item("P001", 10.0, 5.99, Some(Section::Grocery))],
        )]);

        let report = check_list(&list);
        assert_eq!(report.blocked_suppliers, vec!["Atacado Popular".to_string()]);
        assert_eq!(report.count(Severity::Warning), 1);
        assert!(report.findings[0].issue.contains("240.10"));
        assert!(!report.has_critical_issues());
        assert!(report.critical_suppliers().is_empty());
        assert_eq!(report.verdict(), "below minimum: Atacado Popular");
    }

    #[test]
    fn test_item_rules() {
        let mut unavailable = item("P002", 5.0, 10.0, None);
        unavailable.availability = Availability::Unavailable;

        let list = list(vec![
            order("Empty", 0.0, true, vec![]),
            order(
                "Mixed",
                0.0,
                false,
                vec![item("P001", 0.0, 5.0, Some(Section::Produce)), unavailable],
            ),
        ]);

        let report = check_list(&list);
        let rules: Vec<(&str, Severity)> = report.findings.iter().map(|f| (f.rule.as_str(), f.severity)).collect();

        assert_eq!(
            rules,
            vec![
                ("empty_order", Severity::Critical),
                ("zero_quantity", Severity::Critical),
                ("unavailable_item", Severity::Warning),
                ("not_homologated", Severity::Info),
                ("missing_section", Severity::Info),
            ]
        );
        assert!(report.has_critical_issues());
        assert_eq!(report.findings[1].item.as_deref(), Some("P001"));
        assert!(report.summary().contains("5 findings (2 critical, 1 warnings)"));
        assert_eq!(report.critical_suppliers(), vec!["Empty", "Mixed"]);
        assert_eq!(report.verdict(), "blocked: Empty, Mixed");
    }

    #[test]
    fn test_verdict_without_blockers() {
        let clean = list(vec![order(
            "Good",
            50.0,
            true,
            vec![item("P001", 10.0, 6.0, Some(Section::Grocery))],
        )]);
        assert_eq!(check_list(&clean).verdict(), "ready to purchase");

        let mut unavailable = item("P002", 10.0, 6.0, Some(Section::Grocery));
        unavailable.availability = Availability::Unavailable;
        let warned = list(vec![order("Good", 50.0, true, vec![unavailable])]);
        assert_eq!(check_list(&warned).verdict(), "ready with 1 warning(s)");
    }
}
