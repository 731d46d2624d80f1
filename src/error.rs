// ⚠️ Procurement errors - one enum for every domain failure
//
// Binaries wrap these in anyhow; the API maps them onto status codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcurementError {
    #[error("supplier not found: {0}")]
    SupplierNotFound(String),

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("quotation not found: {0}")]
    QuotationNotFound(String),

    #[error("shopping list not found: {0}")]
    ListNotFound(String),

    #[error("supplier {supplier} is not part of shopping list {list}")]
    SupplierNotInList { list: String, supplier: String },

    #[error("item {item} not found in order of supplier {supplier}")]
    LineItemNotFound { supplier: String, item: String },

    #[error("invalid quotation draft: {0}")]
    InvalidDraft(String),

    #[error("invalid price for item {item}: {value:?}")]
    InvalidPrice { item: String, value: String },

    #[error("invalid quantity for item {item}: {value}")]
    InvalidQuantity { item: String, value: f64 },

    #[error("quotation {0} no longer accepts responses")]
    QuotationClosed(String),

    #[error("shopping list {0} is already finalized")]
    AlreadyFinalized(String),

    #[error("shopping list {0} was cancelled")]
    ListCancelled(String),

    #[error("order of supplier {supplier} in shopping list {list} was already purchased")]
    OrderPurchased { list: String, supplier: String },

    #[error("order for {supplier} is below the minimum: {total:.2} < {minimum:.2}")]
    BelowMinimumOrder {
        supplier: String,
        total: f64,
        minimum: f64,
    },

    #[error("no answered quotation has prices to consolidate")]
    NothingToConsolidate,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ProcurementError {
    /// True for lookups that found nothing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProcurementError::SupplierNotFound(_)
                | ProcurementError::ProductNotFound(_)
                | ProcurementError::QuotationNotFound(_)
                | ProcurementError::ListNotFound(_)
                | ProcurementError::SupplierNotInList { .. }
                | ProcurementError::LineItemNotFound { .. }
        )
    }

    /// True when the request is well-formed but the record's state forbids it
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ProcurementError::QuotationClosed(_)
                | ProcurementError::AlreadyFinalized(_)
                | ProcurementError::ListCancelled(_)
                | ProcurementError::OrderPurchased { .. }
                | ProcurementError::BelowMinimumOrder { .. }
                | ProcurementError::NothingToConsolidate
        )
    }
}

pub type Result<T> = std::result::Result<T, ProcurementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ProcurementError::ListNotFound("9".into()).is_not_found());
        assert!(!ProcurementError::ListNotFound("9".into()).is_conflict());

        let purchased = ProcurementError::OrderPurchased {
            list: "1".into(),
            supplier: "2".into(),
        };
        assert!(purchased.is_conflict());
        assert_eq!(
            purchased.to_string(),
            "order of supplier 2 in shopping list 1 was already purchased"
        );

        let below = ProcurementError::BelowMinimumOrder {
            supplier: "Atacado Popular".into(),
            total: 149.9,
            minimum: 300.0,
        };
        assert!(below.is_conflict());
        assert_eq!(
            below.to_string(),
            "order for Atacado Popular is below the minimum: 149.90 < 300.00"
        );

        assert!(!ProcurementError::InvalidDraft("x".into()).is_conflict());
        assert!(!ProcurementError::InvalidDraft("x".into()).is_not_found());
    }
}
