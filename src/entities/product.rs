// 📦 Product Catalog - items that can be quoted and purchased

use serde::{Deserialize, Serialize};

// ============================================================================
// SECTION
// ============================================================================

/// Store section an item is shelved in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Produce,
    Butcher,
    Bakery,
    Grocery,
    Beverages,
    Cleaning,
    Hygiene,
    Frozen,
    Dairy,
    Other,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::Produce,
        Section::Butcher,
        Section::Bakery,
        Section::Grocery,
        Section::Beverages,
        Section::Cleaning,
        Section::Hygiene,
        Section::Frozen,
        Section::Dairy,
        Section::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Produce => "Produce",
            Section::Butcher => "Butcher",
            Section::Bakery => "Bakery",
            Section::Grocery => "Grocery",
            Section::Beverages => "Beverages",
            Section::Cleaning => "Cleaning",
            Section::Hygiene => "Hygiene",
            Section::Frozen => "Frozen",
            Section::Dairy => "Dairy",
            Section::Other => "Other",
        }
    }

    /// English or Portuguese label, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Section::ALL
            .iter()
            .copied()
            .find(|section| section.as_str().to_lowercase() == lower)
            .or(match lower.as_str() {
                "hortifruti" => Some(Section::Produce),
                "açougue" | "acougue" => Some(Section::Butcher),
                "padaria" => Some(Section::Bakery),
                "mercearia" => Some(Section::Grocery),
                "bebidas" => Some(Section::Beverages),
                "limpeza" => Some(Section::Cleaning),
                "higiene" => Some(Section::Hygiene),
                "congelados" => Some(Section::Frozen),
                "laticínios" | "laticinios" => Some(Section::Dairy),
                "outros" => Some(Section::Other),
                _ => None,
            })
    }
}

// ============================================================================
// PRODUCT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,

    /// Short catalogue code, e.g. "P001"
    pub code: String,

    pub name: String,

    /// kg, L, un, ...
    pub unit: String,

    pub category: String,

    /// Reference price used to estimate quotation totals
    pub average_price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        category: impl Into<String>,
        average_price: f64,
    ) -> Self {
        Product {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            unit: unit.into(),
            category: category.into(),
            average_price,
            section: None,
        }
    }

    pub fn in_section(mut self, section: Section) -> Self {
        self.section = Some(section);
        self
    }

    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.code.to_lowercase().contains(&term)
    }
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product; a product with the same id is replaced
    pub fn register(&mut self, product: Product) {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn find_by_code(&self, code: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
    }

    pub fn search(&self, term: &str) -> Vec<&Product> {
        self.products.iter().filter(|p| p.matches(term)).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .collect()
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ProductCatalog {
        let mut catalog = ProductCatalog::new();
        catalog.register(
            Product::new("1", "P001", "Arroz Integral", "kg", "Grains", 5.99).in_section(Section::Grocery),
        );
        catalog.register(Product::new("2", "P002", "Feijão Preto", "kg", "Grains", 7.90));
        catalog.register(Product::new("3", "P003", "Leite Integral", "L", "Dairy", 4.50));
        catalog
    }

    #[test]
    fn test_section_parse() {
        assert_eq!(Section::parse("Mercearia"), Some(Section::Grocery));
        assert_eq!(Section::parse("dairy"), Some(Section::Dairy));
        assert_eq!(Section::parse("Laticínios"), Some(Section::Dairy));
        assert_eq!(Section::parse("garage"), None);
        assert_eq!(Section::ALL.len(), 10);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = catalog();

        assert_eq!(catalog.find_by_code("p002").unwrap().name, "Feijão Preto");
        assert_eq!(catalog.find_by_id("3").unwrap().unit, "L");
        assert!(catalog.find_by_id("9").is_none());
        assert_eq!(catalog.by_category("grains").len(), 2);
    }

    #[test]
    fn test_catalog_search() {
        let catalog = catalog();

        assert_eq!(catalog.search("integral").len(), 2);
        assert_eq!(catalog.search("P003").len(), 1);
        assert_eq!(catalog.search("").len(), 3);
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut catalog = catalog();
        catalog.register(Product::new("1", "P001", "Arroz Parboilizado", "kg", "Grains", 6.20));

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.find_by_id("1").unwrap().name, "Arroz Parboilizado");
    }
}
