// Entity Models
//
// Suppliers keep a stable identity with a timeline of versions;
// products are plain catalogue records.

pub mod product;
pub mod supplier;

pub use product::{Product, ProductCatalog, Section};
pub use supplier::{Supplier, SupplierKind, SupplierRegistry};
