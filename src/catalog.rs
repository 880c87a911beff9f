//! Read-only product catalog and the queries the menu, home page and product page run against it.
//!
//! The catalog is loaded once and never mutated. All queries are linear scans that
//! preserve catalog order; at bakery scale an index buys nothing.

use std::collections::HashSet;

use crate::domain::aggregates::{Category, Product};
use crate::{Result, StorefrontError};

#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Fails if two products share an id.
    pub fn new(products: Vec<Product>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(products.len());
        for p in &products {
            if !seen.insert(p.id().as_str()) {
                return Err(StorefrontError::DuplicateProduct(p.id().to_string()));
            }
        }
        Ok(Self { products })
    }

    /// The bakery's standard menu, held to the same id rules as [`Catalog::new`].
    pub fn seeded() -> Result<Self> {
        Self::new(crate::seed::products())
    }

    pub fn all(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    pub fn get_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    pub fn by_category(&self, category: Category) -> Vec<&Product> {
        self.products.iter().filter(|p| p.category() == category).collect()
    }

    pub fn featured(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_featured()).collect()
    }

    /// Case-insensitive substring match on name or description.
    ///
    /// The query is trimmed first, so a blank query matches every product.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.products.iter().collect();
        }
        self.products.iter().filter(|p| p.matches(&needle)).collect()
    }

    /// Menu filter: a non-blank query wins over the category.
    pub fn browse(&self, category: Option<Category>, query: Option<&str>) -> Vec<&Product> {
        match (query.filter(|q| !q.trim().is_empty()), category) {
            (Some(q), _) => self.search(q),
            (None, Some(c)) => self.by_category(c),
            (None, None) => self.products.iter().collect(),
        }
    }
}
