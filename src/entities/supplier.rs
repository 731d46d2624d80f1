// 🏪 Supplier Entity - Stable identity + versioned values
//
// "Supplier name is a VALUE (can change), Supplier UUID is IDENTITY (never changes)"
//
// Problem solved:
// - Homologation or minimum-order changes never rewrite history
// - Quotations and shopping lists keep pointing at the same supplier id

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProcurementError, Result};

// ============================================================================
// SUPPLIER KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierKind {
    /// Cash-and-carry wholesaler (atacadista)
    Wholesaler,

    /// Distributor
    Distributor,

    /// Manufacturer selling direct
    Manufacturer,

    /// Online store
    Ecommerce,

    /// Retail store (varejista)
    Retailer,
}

impl SupplierKind {
    pub const ALL: [SupplierKind; 5] = [
        SupplierKind::Wholesaler,
        SupplierKind::Distributor,
        SupplierKind::Manufacturer,
        SupplierKind::Ecommerce,
        SupplierKind::Retailer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierKind::Wholesaler => "Wholesaler",
            SupplierKind::Distributor => "Distributor",
            SupplierKind::Manufacturer => "Manufacturer",
            SupplierKind::Ecommerce => "E-commerce",
            SupplierKind::Retailer => "Retailer",
        }
    }

    /// Accepts the English label or the Portuguese code used by the old dashboard
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wholesaler" | "atacadista" => Some(SupplierKind::Wholesaler),
            "distributor" | "distribuidor" => Some(SupplierKind::Distributor),
            "manufacturer" | "fabricante" => Some(SupplierKind::Manufacturer),
            "ecommerce" | "e-commerce" => Some(SupplierKind::Ecommerce),
            "retailer" | "varejista" => Some(SupplierKind::Retailer),
            _ => None,
        }
    }
}

// ============================================================================
// SUPPLIER ENTITY
// ============================================================================

/// Supplier (fornecedor)
///
/// Identity: UUID (never changes)
/// Values: name, location, minimum order, homologation (can change over time)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    /// Stable identity - NEVER changes
    pub id: String,

    pub name: String,
    pub kind: SupplierKind,

    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,

    /// Smallest order total the supplier accepts
    #[serde(default)]
    pub minimum_order: f64,

    /// Approved vendor
    #[serde(default)]
    pub homologated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    // ========================================================================
    // VERSIONING
    // ========================================================================
    #[serde(default = "first_version")]
    pub version: i64,
    #[serde(default = "Utc::now")]
    pub system_time: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub valid_from: DateTime<Utc>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

fn first_version() -> i64 {
    1
}

impl Supplier {
    /// Create new supplier entity with UUID
    pub fn new(name: impl Into<String>, kind: SupplierKind, minimum_order: f64) -> Self {
        let now = Utc::now();

        Supplier {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            neighborhood: String::new(),
            city: String::new(),
            state: String::new(),
            minimum_order,
            homologated: false,
            website: None,
            phone: None,
            version: 1,
            system_time: now,
            valid_from: now,
            valid_until: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_location(
        mut self,
        neighborhood: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.neighborhood = neighborhood.into();
        self.city = city.into();
        self.state = state.into();
        self
    }

    pub fn homologated(mut self, homologated: bool) -> Self {
        self.homologated = homologated;
        self
    }

    pub fn with_website(mut self, url: impl Into<String>) -> Self {
        self.website = Some(url.into());
        self
    }

    /// "Centro, São Paulo - SP"
    pub fn location(&self) -> String {
        match (self.neighborhood.is_empty(), self.city.is_empty()) {
            (true, true) => self.state.clone(),
            (true, false) => format!("{} - {}", self.city, self.state),
            _ => format!("{}, {} - {}", self.neighborhood, self.city, self.state),
        }
    }

    /// Case-insensitive match on name or city. Blank term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&term) || self.city.to_lowercase().contains(&term)
    }

    pub fn is_current(&self) -> bool {
        self.valid_until.is_none()
    }

    /// Create next version (for updating values)
    pub fn next_version(&self) -> Supplier {
        let now = Utc::now();
        let mut next = self.clone();
        next.version += 1;
        next.system_time = now;
        next.valid_from = now;
        next.valid_until = None;
        next
    }
}

// ============================================================================
// SUPPLIER REGISTRY
// ============================================================================

/// Registry of all known suppliers
///
/// Multi-version storage: every version is kept, updates expire the
/// current one and append its successor.
#[derive(Debug, Clone, Default)]
pub struct SupplierRegistry {
    versions: Vec<Supplier>,
}

impl SupplierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a supplier version (append-only)
    pub fn register(&mut self, supplier: Supplier) -> String {
        let id = supplier.id.clone();
        self.versions.push(supplier);
        id
    }

    pub fn get_all_versions(&self, id: &str) -> Vec<Supplier> {
        self.versions.iter().filter(|s| s.id == id).cloned().collect()
    }

    pub fn current(&self, id: &str) -> Option<&Supplier> {
        self.versions.iter().find(|s| s.id == id && s.is_current())
    }

    pub fn find_by_id(&self, id: &str) -> Option<Supplier> {
        self.current(id).cloned()
    }

    /// Supplier as it was at a given time
    pub fn supplier_at_time(&self, id: &str, as_of: DateTime<Utc>) -> Option<Supplier> {
        self.versions
            .iter()
            .filter(|s| s.id == id)
            .find(|s| s.valid_from <= as_of && s.valid_until.map_or(true, |until| until > as_of))
            .cloned()
    }

    /// Update supplier (creates new version, expires old version)
    pub fn update_supplier<F>(&mut self, id: &str, update_fn: F) -> Result<Supplier>
    where
        F: FnOnce(&mut Supplier),
    {
        let now = Utc::now();

        let position = self
            .versions
            .iter()
            .position(|s| s.id == id && s.is_current())
            .ok_or_else(|| ProcurementError::SupplierNotFound(id.to_string()))?;

        let mut next = self.versions[position].next_version();
        update_fn(&mut next);
        next.id = id.to_string();

        self.versions[position].valid_until = Some(now);
        self.versions.push(next.clone());

        tracing::debug!(supplier = %next.name, version = next.version, "supplier updated");
        Ok(next)
    }

    pub fn set_homologated(&mut self, id: &str, homologated: bool) -> Result<Supplier> {
        self.update_supplier(id, |s| s.homologated = homologated)
    }

    /// Current versions only, sorted by name
    pub fn all_suppliers(&self) -> Vec<Supplier> {
        let mut current: Vec<Supplier> =
            self.versions.iter().filter(|s| s.is_current()).cloned().collect();
        current.sort_by(|a, b| a.name.cmp(&b.name));
        current
    }

    pub fn search(&self, term: &str) -> Vec<Supplier> {
        self.all_suppliers()
            .into_iter()
            .filter(|s| s.matches(term))
            .collect()
    }

    pub fn by_kind(&self, kind: SupplierKind) -> Vec<Supplier> {
        self.all_suppliers()
            .into_iter()
            .filter(|s| s.kind == kind)
            .collect()
    }

    pub fn homologated(&self) -> Vec<Supplier> {
        self.all_suppliers()
            .into_iter()
            .filter(|s| s.homologated)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.versions.iter().filter(|s| s.is_current()).count()
    }
}

// ============================================================================
// TESTS
// ============================================================================
