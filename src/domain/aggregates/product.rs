//! Product Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::ProductId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    image: String,
    category: Category,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    allergens: Vec<String>,
    #[serde(default)]
    nutritional_info: Option<NutritionalInfo>,
    available: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionalInfo { pub calories: u32, pub protein: u32, pub carbs: u32, pub fat: u32 }

/// Menu section a product is listed under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category { Bread, Cake, Sweet, Savory, Beverage }

impl Category {
    pub const ALL: [Category; 5] = [Self::Bread, Self::Cake, Self::Sweet, Self::Savory, Self::Beverage];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bread => "Pães",
            Self::Cake => "Bolos",
            Self::Sweet => "Doces",
            Self::Savory => "Salgados",
            Self::Beverage => "Bebidas",
        }
    }
}

impl Product {
    pub fn create(id: ProductId, name: impl Into<String>, price: Decimal, category: Category) -> Self {
        Self {
            id, name: name.into(), description: String::new(), price, image: String::new(), category,
            featured: false, ingredients: vec![], allergens: vec![], nutritional_info: None, available: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self { self.description = description.into(); self }
    pub fn with_image(mut self, url: impl Into<String>) -> Self { self.image = url.into(); self }
    pub fn featured(mut self) -> Self { self.featured = true; self }
    pub fn unavailable(mut self) -> Self { self.available = false; self }
    pub fn with_ingredients<I: IntoIterator<Item = S>, S: Into<String>>(mut self, items: I) -> Self {
        self.ingredients = items.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_allergens<I: IntoIterator<Item = S>, S: Into<String>>(mut self, items: I) -> Self {
        self.allergens = items.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_nutrition(mut self, info: NutritionalInfo) -> Self { self.nutritional_info = Some(info); self }

    pub fn id(&self) -> &ProductId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> &str { &self.description }
    pub fn price(&self) -> Decimal { self.price }
    pub fn image(&self) -> &str { &self.image }
    pub fn category(&self) -> Category { self.category }
    pub fn is_featured(&self) -> bool { self.featured }
    pub fn ingredients(&self) -> &[String] { &self.ingredients }
    pub fn allergens(&self) -> &[String] { &self.allergens }
    pub fn nutritional_info(&self) -> Option<&NutritionalInfo> { self.nutritional_info.as_ref() }
    pub fn is_available(&self) -> bool { self.available }

    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_product_create() {
        let p = Product::create(ProductId::new("3").unwrap(), "Croissant", Decimal::new(490, 2), Category::Bread);
        assert_eq!(p.name(), "Croissant");
        assert!(p.is_available());
        assert!(!p.is_featured());
    }
    #[test]
    fn test_matches_is_case_insensitive_on_both_fields() {
        let p = Product::create(ProductId::new("7").unwrap(), "Pão de Queijo", Decimal::new(250, 2), Category::Bread)
            .with_description("Tradicional pão de queijo MINEIRO");
        assert!(p.matches("queijo"));
        assert!(p.matches("mineiro"));
        assert!(!p.matches("chocolate"));
    }
    #[test]
    fn test_category_wire_names() {
        assert_eq!(serde_json::to_string(&Category::Savory).unwrap(), "\"savory\"");
        assert_eq!(serde_json::from_str::<Category>("\"beverage\"").unwrap(), Category::Beverage);
        assert!(serde_json::from_str::<Category>("\"pizza\"").is_err());
    }
}
