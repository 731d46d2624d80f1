// Reduzo Procurement Desk - Core Library
// Exposes all modules for use in the dashboard, the API server, and tests

pub mod config;
pub mod consolidation;  // Answered quotations → shopping list
pub mod entities;
pub mod error;
pub mod export;
pub mod logging;
pub mod quality;        // Pre-purchase checks
pub mod quotation;
pub mod quotation_book;
pub mod seed;
pub mod shopping_list;
pub mod statistics;
pub mod workspace;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::AppConfig;
pub use consolidation::consolidate;
pub use entities::{Product, ProductCatalog, Section, Supplier, SupplierKind, SupplierRegistry};
pub use error::{ProcurementError, Result};
pub use export::{export_to_path, write_csv};
pub use quality::{check_list, Finding, QualityReport, Severity};
pub use quotation::{
    Quotation, QuotationDraft, QuotationKind, QuotationResponse, QuotationStatus, ResponseDeadline,
    ResponseForm,
};
pub use quotation_book::{QuotationBook, QuotationFilter, SubmitOutcome};
pub use shopping_list::{
    ItemEdit, LineItem, ListFilter, ListStatus, ListTab, MoveDirection, PurchaseReceipt, ShoppingList,
    ShoppingListBook, SupplierOrder,
};
pub use statistics::QuotationStats;
pub use workspace::Workspace;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Round a money amount to cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(59.900000000000006), 59.9);
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(-1.005), -1.0);
    }
}
