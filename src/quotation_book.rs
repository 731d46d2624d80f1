// 📚 Quotation Book - in-memory store of issued quotations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{ProductCatalog, SupplierRegistry};
use crate::error::{ProcurementError, Result};
use crate::quotation::{
    Quotation, QuotationDraft, QuotationItem, QuotationKind, QuotationResponse, QuotationStatus,
    ResponseDeadline,
};

/// Kind and status filter used by the quotation page tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationFilter {
    /// None = both kinds
    pub kind: Option<QuotationKind>,

    /// None = all statuses
    pub status: Option<QuotationStatus>,
}

impl QuotationFilter {
    pub fn kind(kind: QuotationKind) -> Self {
        QuotationFilter {
            kind: Some(kind),
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<QuotationStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn matches(&self, quotation: &Quotation) -> bool {
        self.kind.map_or(true, |k| quotation.kind == k)
            && self.status.map_or(true, |s| quotation.status == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Response stored, quotation answered
    Recorded,

    /// Identical response already on file
    Duplicate,
}

#[derive(Debug, Clone, Default)]
pub struct QuotationBook {
    quotations: Vec<Quotation>,
    automatic_seq: u32,
    manual_seq: u32,
}

impl QuotationBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_sequence(&mut self, kind: QuotationKind) -> u32 {
        let seq = match kind {
            QuotationKind::Automatic => &mut self.automatic_seq,
            QuotationKind::Manual => &mut self.manual_seq,
        };
        *seq += 1;
        *seq
    }

    /// Issue a quotation from a validated draft
    pub fn create(
        &mut self,
        draft: &QuotationDraft,
        kind: QuotationKind,
        suppliers: &SupplierRegistry,
        catalog: &ProductCatalog,
        now: DateTime<Utc>,
    ) -> Result<&Quotation> {
        draft.validate()?;

        let supplier_id = draft.supplier_id.as_deref().unwrap_or_default();
        let supplier = suppliers
            .current(supplier_id)
            .ok_or_else(|| ProcurementError::SupplierNotFound(supplier_id.to_string()))?;

        let items = draft
            .items
            .iter()
            .map(|item| {
                let product = catalog
                    .find_by_id(&item.product_id)
                    .ok_or_else(|| ProcurementError::ProductNotFound(item.product_id.clone()))?;
                Ok(QuotationItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    quantity: item.quantity,
                    average_price: product.average_price,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let seq = self.next_sequence(kind);
        let quotation = Quotation {
            id: uuid::Uuid::new_v4().to_string(),
            code: format!("COT-{}-{:03}", kind.code_letter(), seq),
            name: draft.name.trim().to_string(),
            issued_at: now,
            supplier_id: supplier.id.clone(),
            supplier_name: supplier.name.clone(),
            deadline: draft.deadline,
            items,
            status: QuotationStatus::Open,
            kind,
            note: Some(draft.note.trim().to_string()).filter(|n| !n.is_empty()),
            supplier_url: supplier.website.clone(),
            response: None,
        };

        tracing::info!(
            code = %quotation.code,
            supplier = %quotation.supplier_name,
            items = quotation.items.len(),
            "quotation created"
        );

        self.quotations.push(quotation);
        let index = self.quotations.len() - 1;
        Ok(&self.quotations[index])
    }

    /// Store an existing quotation (seed data); keeps code sequences ahead of it
    pub fn insert(&mut self, quotation: Quotation) {
        let seq = quotation
            .code
            .rsplit('-')
            .next()
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(0);
        let counter = match quotation.kind {
            QuotationKind::Automatic => &mut self.automatic_seq,
            QuotationKind::Manual => &mut self.manual_seq,
        };
        *counter = (*counter).max(seq);

        self.quotations.push(quotation);
    }

    pub fn get(&self, id: &str) -> Result<&Quotation> {
        self.quotations
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| ProcurementError::QuotationNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Quotation> {
        self.quotations
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| ProcurementError::QuotationNotFound(id.to_string()))
    }

    /// Quotations matching the filter, newest first
    pub fn list(&self, filter: &QuotationFilter) -> Vec<&Quotation> {
        let mut found: Vec<&Quotation> = self.quotations.iter().filter(|q| filter.matches(q)).collect();
        found.sort_by(|a, b| b.issued_at.cmp(&a.issued_at).then_with(|| b.code.cmp(&a.code)));
        found
    }

    pub fn all(&self) -> &[Quotation] {
        &self.quotations
    }

    pub fn len(&self) -> usize {
        self.quotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotations.is_empty()
    }

    pub fn answered(&self) -> Vec<&Quotation> {
        self.quotations
            .iter()
            .filter(|q| q.status == QuotationStatus::Answered)
            .collect()
    }

    pub fn update_deadline(&mut self, id: &str, deadline: ResponseDeadline) -> Result<&Quotation> {
        let quotation = self.get_mut(id)?;
        quotation.deadline = deadline;
        tracing::info!(code = %quotation.code, deadline = %deadline.label(), "deadline updated");
        Ok(quotation)
    }

    pub fn delete(&mut self, id: &str) -> Result<Quotation> {
        let index = self
            .quotations
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| ProcurementError::QuotationNotFound(id.to_string()))?;
        let removed = self.quotations.remove(index);
        tracing::info!(code = %removed.code, "quotation deleted");
        Ok(removed)
    }

    /// Record a supplier's prices
    ///
    /// Only open quotations accept responses. A response that arrives after
    /// the deadline closes the quotation as unanswered.
    pub fn submit_response(&mut self, id: &str, response: QuotationResponse) -> Result<SubmitOutcome> {
        let quotation = self.get_mut(id)?;

        match quotation.status {
            QuotationStatus::Answered => {
                let same = quotation
                    .response
                    .as_ref()
                    .map_or(false, |existing| existing.fingerprint == response.fingerprint);
                if same {
                    tracing::debug!(code = %quotation.code, "duplicate response ignored");
                    Ok(SubmitOutcome::Duplicate)
                } else {
                    Err(ProcurementError::QuotationClosed(quotation.id.clone()))
                }
            }
            QuotationStatus::Unanswered => Err(ProcurementError::QuotationClosed(quotation.id.clone())),
            QuotationStatus::Open => {
                if quotation.is_overdue(response.submitted_at) {
                    quotation.status = QuotationStatus::Unanswered;
                    tracing::warn!(code = %quotation.code, "response arrived after the deadline");
                    return Err(ProcurementError::QuotationClosed(quotation.id.clone()));
                }

                quotation.response = Some(response);
                quotation.status = QuotationStatus::Answered;
                tracing::info!(code = %quotation.code, "quotation answered");
                Ok(SubmitOutcome::Recorded)
            }
        }
    }

    /// Open quotations past their deadline become unanswered
    pub fn refresh_statuses(&mut self, now: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for quotation in self.quotations.iter_mut().filter(|q| q.is_overdue(now)) {
            quotation.status = QuotationStatus::Unanswered;
            changed += 1;
        }
        if changed > 0 {
            tracing::info!(changed, "overdue quotations closed");
        }
        changed
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Product, Supplier, SupplierKind};
    use crate::quotation::{DraftItem, ResponseForm};
    use chrono::{Duration, TimeZone};

    struct Fixture {
        book: QuotationBook,
        suppliers: SupplierRegistry,
        catalog: ProductCatalog,
        supplier_id: String,
        now: DateTime<Utc>,
    }

    fn fixture() -> Fixture {
        let mut suppliers = SupplierRegistry::new();
        let supplier_id = suppliers.register(
            Supplier::new("Supplier A", SupplierKind::Wholesaler, 0.0).with_website("https://a.example"),
        );

        let mut catalog = ProductCatalog::new();
        catalog.register(Product::new("1", "A", "Product A", "un", "General", 10.50));
        catalog.register(Product::new("2", "B", "Product B", "un", "General", 25.00));

        Fixture {
            book: QuotationBook::new(),
            suppliers,
            catalog,
            supplier_id,
            now: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        }
    }

    fn draft(supplier_id: &str) -> QuotationDraft {
        let mut draft = QuotationDraft::new("Weekly").with_supplier(supplier_id);
        draft.add_item("1");
        draft.add_item("2");
        draft.set_quantity("1", 10).unwrap();
        draft
    }

    fn create(f: &mut Fixture, kind: QuotationKind) -> String {
        let d = draft(&f.supplier_id);
        f.book
            .create(&d, kind, &f.suppliers, &f.catalog, f.now)
            .unwrap()
            .id
            .clone()
    }

    #[test]
    fn test_create_assigns_codes_per_kind() {
        let mut f = fixture();

        let a1 = create(&mut f, QuotationKind::Automatic);
        let a2 = create(&mut f, QuotationKind::Automatic);
        let m1 = create(&mut f, QuotationKind::Manual);

        assert_eq!(f.book.get(&a1).unwrap().code, "COT-A-001");
        assert_eq!(f.book.get(&a2).unwrap().code, "COT-A-002");
        assert_eq!(f.book.get(&m1).unwrap().code, "COT-M-001");

        let q = f.book.get(&a1).unwrap();
        assert_eq!(q.status, QuotationStatus::Open);
        assert_eq!(q.supplier_name, "Supplier A");
        assert_eq!(q.supplier_url.as_deref(), Some("https://a.example"));
        assert_eq!(q.estimated_total(), 130.0);
    }

    #[test]
    fn test_create_rejects_invalid_drafts() {
        let mut f = fixture();

        let empty = QuotationDraft::new("Weekly").with_supplier(f.supplier_id.clone());
        assert!(matches!(
            f.book.create(&empty, QuotationKind::Manual, &f.suppliers, &f.catalog, f.now),
            Err(ProcurementError::InvalidDraft(_))
        ));

        let unknown_supplier = draft("nobody");
        assert!(matches!(
            f.book.create(&unknown_supplier, QuotationKind::Manual, &f.suppliers, &f.catalog, f.now),
            Err(ProcurementError::SupplierNotFound(_))
        ));

        let mut unknown_product = draft(&f.supplier_id);
        unknown_product.add_item("77");
        assert!(matches!(
            f.book.create(&unknown_product, QuotationKind::Manual, &f.suppliers, &f.catalog, f.now),
            Err(ProcurementError::ProductNotFound(_))
        ));

        assert!(f.book.is_empty());
    }

    #[test]
    fn test_create_rejects_repeated_product() {
        let mut f = fixture();

        let mut repeated = draft(&f.supplier_id);
        repeated.items.push(DraftItem {
            product_id: "1".to_string(),
            quantity: 5,
        });

        let err = f
            .book
            .create(&repeated, QuotationKind::Automatic, &f.suppliers, &f.catalog, f.now)
            .unwrap_err();
        assert!(matches!(err, ProcurementError::InvalidDraft(_)));
        assert!(err.to_string().contains("product 1 is listed more than once"));
        assert!(f.book.is_empty());
    }

    #[test]
    fn test_insert_keeps_sequence_ahead() {
        let mut f = fixture();
        let id = create(&mut f, QuotationKind::Manual);
        let mut seeded = f.book.get(&id).unwrap().clone();
        seeded.id = "seeded".into();
        seeded.code = "COT-M-007".into();
        f.book.insert(seeded);

        let next = create(&mut f, QuotationKind::Manual);
        assert_eq!(f.book.get(&next).unwrap().code, "COT-M-008");
    }

    #[test]
    fn test_list_filters() {
        let mut f = fixture();
        let a1 = create(&mut f, QuotationKind::Automatic);
        create(&mut f, QuotationKind::Automatic);
        create(&mut f, QuotationKind::Manual);

        let form = ResponseForm::new(f.book.get(&a1).unwrap());
        f.book.submit_response(&a1, form.into_response(f.now)).unwrap();

        assert_eq!(f.book.list(&QuotationFilter::default()).len(), 3);
        assert_eq!(f.book.list(&QuotationFilter::kind(QuotationKind::Automatic)).len(), 2);

        let answered = QuotationFilter::kind(QuotationKind::Automatic)
            .with_status(Some(QuotationStatus::Answered));
        let found = f.book.list(&answered);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a1);

        let manual_answered = QuotationFilter::kind(QuotationKind::Manual)
            .with_status(Some(QuotationStatus::Answered));
        assert!(f.book.list(&manual_answered).is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let mut f = fixture();
        let older = create(&mut f, QuotationKind::Automatic);
        f.now = f.now + Duration::hours(1);
        let newer = create(&mut f, QuotationKind::Automatic);

        let listed = f.book.list(&QuotationFilter::default());
        assert_eq!(listed[0].id, newer);
        assert_eq!(listed[1].id, older);
    }

    #[test]
    fn test_update_deadline_and_delete() {
        let mut f = fixture();
        let id = create(&mut f, QuotationKind::Automatic);

        f.book.update_deadline(&id, ResponseDeadline::Hours(72)).unwrap();
        assert_eq!(f.book.get(&id).unwrap().deadline, ResponseDeadline::Hours(72));

        let removed = f.book.delete(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(f.book.get(&id).is_err());
        assert!(f.book.delete(&id).is_err());
    }

    #[test]
    fn test_submit_response_is_idempotent() {
        let mut f = fixture();
        let id = create(&mut f, QuotationKind::Automatic);

        let mut form = ResponseForm::new(f.book.get(&id).unwrap());
        form.set_price("1", "9.5").unwrap();
        let response = form.clone().into_response(f.now + Duration::hours(1));

        assert_eq!(f.book.submit_response(&id, response.clone()).unwrap(), SubmitOutcome::Recorded);
        assert_eq!(f.book.get(&id).unwrap().status, QuotationStatus::Answered);

        // Same content again
        assert_eq!(f.book.submit_response(&id, response).unwrap(), SubmitOutcome::Duplicate);

        // Different content after answering
        form.set_price("1", "8").unwrap();
        let changed = form.into_response(f.now + Duration::hours(2));
        assert!(matches!(
            f.book.submit_response(&id, changed),
            Err(ProcurementError::QuotationClosed(_))
        ));
    }

    #[test]
    fn test_late_response_closes_quotation() {
        let mut f = fixture();
        let id = create(&mut f, QuotationKind::Automatic);

        let form = ResponseForm::new(f.book.get(&id).unwrap());
        let late = form.into_response(f.now + Duration::hours(25));

        assert!(f.book.submit_response(&id, late).is_err());
        assert_eq!(f.book.get(&id).unwrap().status, QuotationStatus::Unanswered);
    }

    #[test]
    fn test_refresh_statuses() {
        let mut f = fixture();
        let short = create(&mut f, QuotationKind::Automatic);
        let open_ended = create(&mut f, QuotationKind::Automatic);
        f.book.update_deadline(&short, ResponseDeadline::Hours(2)).unwrap();
        f.book.update_deadline(&open_ended, ResponseDeadline::NoDeadline).unwrap();

        assert_eq!(f.book.refresh_statuses(f.now + Duration::hours(1)), 0);
        assert_eq!(f.book.refresh_statuses(f.now + Duration::hours(3)), 1);
        assert_eq!(f.book.get(&short).unwrap().status, QuotationStatus::Unanswered);
        assert_eq!(f.book.get(&open_ended).unwrap().status, QuotationStatus::Open);

        // Already closed ones are not counted again
        assert_eq!(f.book.refresh_statuses(f.now + Duration::hours(4)), 0);
    }
}
