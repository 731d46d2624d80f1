// 🗂️ Workspace - the in-memory stores both front ends work on

use chrono::{DateTime, NaiveDate, Utc};
use std::path::Path;

use crate::consolidation;
use crate::entities::{ProductCatalog, SupplierRegistry};
use crate::error::Result;
use crate::quotation::QuotationStatus;
use crate::quotation_book::QuotationBook;
use crate::seed::{self, SeedData};
use crate::shopping_list::{ShoppingList, ShoppingListBook};
use crate::statistics::QuotationStats;

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub suppliers: SupplierRegistry,
    pub catalog: ProductCatalog,
    pub quotations: QuotationBook,
    pub lists: ShoppingListBook,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let mut workspace = Workspace::new();
        for supplier in seed.suppliers {
            workspace.suppliers.register(supplier);
        }
        for product in seed.products {
            workspace.catalog.register(product);
        }
        for quotation in seed.quotations {
            workspace.quotations.insert(quotation);
        }
        for list in seed.shopping_lists {
            workspace.lists.insert(list);
        }

        tracing::info!(
            suppliers = workspace.suppliers.count(),
            products = workspace.catalog.len(),
            quotations = workspace.quotations.len(),
            lists = workspace.lists.len(),
            "workspace loaded"
        );
        workspace
    }

    /// Built-in demo data
    pub fn demo(now: DateTime<Utc>) -> Self {
        Self::from_seed(seed::demo(now))
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_seed(SeedData::load(path)?))
    }

    pub fn quotation_stats(&self) -> QuotationStats {
        QuotationStats::compute(self.quotations.all())
    }

    /// Turn every answered quotation into a new pending shopping list
    pub fn consolidate_answers(&mut self, issued_on: NaiveDate) -> Result<&ShoppingList> {
        let id = self.lists.next_id();
        let answered = self
            .quotations
            .all()
            .iter()
            .filter(|q| q.status == QuotationStatus::Answered);
        let list = consolidation::consolidate(id.as_str(), answered, &self.suppliers, &self.catalog, issued_on)?;

        self.lists.insert(list);
        self.lists.get(&id)
    }
}
