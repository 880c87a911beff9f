//! Seed data: the bakery menu and the mock order history shown on the orders page.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::catalog::Catalog;
use crate::domain::aggregates::{Category, DeliveryAddress, NutritionalInfo, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Product};
use crate::domain::value_objects::ProductId;

/// Static placeholder shown in place of a generated PIX payload.
pub const PIX_CODE: &str = "00020126580014BR.GOV.BCB.PIX0136a629532e-7693-4846-b028-f142113bd8f15204000053039865802BR5913Padaria Art6009SAO PAULO62070503***63041D3D";

const PHOTOS: &str = "https://images.pexels.com/photos";

fn nutrition(calories: u32, protein: u32, carbs: u32, fat: u32) -> NutritionalInfo {
    NutritionalInfo { calories, protein, carbs, fat }
}

fn product(id: &'static str, name: &str, cents: i64, category: Category) -> Product {
    // ids below are literals, never blank
    let id = ProductId::new(id).unwrap_or_else(|_| unreachable!("seed product ids are non-empty"));
    Product::create(id, name, Decimal::new(cents, 2), category)
}

pub fn products() -> Vec<Product> {
    vec![
        product("1", "Pão Francês", 50, Category::Bread)
            .with_description("Pão francês tradicional, crocante por fora e macio por dentro. Feito com carinho todas as manhãs.")
            .with_image(format!("{PHOTOS}/1775043/pexels-photo-1775043.jpeg"))
            .featured()
            .with_ingredients(["farinha de trigo", "água", "fermento", "sal"])
            .with_allergens(["glúten"])
            .with_nutrition(nutrition(140, 4, 28, 1)),
        product("2", "Bolo de Chocolate", 3590, Category::Cake)
            .with_description("Bolo de chocolate fofinho com cobertura de ganache. Uma explosão de sabor para os amantes de chocolate.")
            .with_image(format!("{PHOTOS}/132694/pexels-photo-132694.jpeg"))
            .featured()
            .with_ingredients(["farinha de trigo", "chocolate em pó", "ovos", "açúcar", "leite", "manteiga"])
            .with_allergens(["glúten", "leite", "ovos"])
            .with_nutrition(nutrition(350, 5, 45, 18)),
        product("3", "Croissant", 490, Category::Bread)
            .with_description("Croissant folhado e amanteigado. Perfeito para um café da manhã especial.")
            .with_image(format!("{PHOTOS}/2135/food-france-morning-breakfast.jpg"))
            .with_ingredients(["farinha de trigo", "manteiga", "açúcar", "fermento", "sal"])
            .with_allergens(["glúten", "leite"])
            .with_nutrition(nutrition(240, 5, 26, 12)),
        product("4", "Coxinha de Frango", 450, Category::Savory)
            .with_description("Coxinha crocante recheada com frango desfiado temperado. Um dos salgados mais queridos do Brasil.")
            .with_image(format!("{PHOTOS}/5779766/pexels-photo-5779766.jpeg"))
            .featured()
            .with_ingredients(["massa de batata", "farinha de trigo", "frango desfiado", "temperos"])
            .with_allergens(["glúten", "frango"])
            .with_nutrition(nutrition(280, 10, 30, 14)),
        product("5", "Pudim de Leite", 890, Category::Sweet)
            .with_description("Pudim cremoso de leite condensado com calda de caramelo. Uma sobremesa clássica e irresistível.")
            .with_image(format!("{PHOTOS}/3186961/pexels-photo-3186961.jpeg"))
            .featured()
            .with_ingredients(["leite condensado", "leite", "ovos", "açúcar"])
            .with_allergens(["leite", "ovos"])
            .with_nutrition(nutrition(220, 6, 35, 8)),
        product("6", "Café Expresso", 350, Category::Beverage)
            .with_description("Café expresso forte e aromático. Perfeito para começar o dia com energia.")
            .with_image(format!("{PHOTOS}/302899/pexels-photo-302899.jpeg"))
            .with_ingredients(["café"])
            .with_nutrition(nutrition(2, 0, 0, 0)),
        product("7", "Pão de Queijo", 250, Category::Bread)
            .with_description("Tradicional pão de queijo mineiro, quentinho e com muito queijo. Irresistível a qualquer hora do dia.")
            .with_image(format!("{PHOTOS}/11659236/pexels-photo-11659236.jpeg"))
            .featured()
            .with_ingredients(["polvilho", "queijo", "óleo", "leite", "ovos"])
            .with_allergens(["leite", "ovos"])
            .with_nutrition(nutrition(130, 5, 15, 7)),
        product("8", "Brigadeiro Gourmet", 490, Category::Sweet)
            .with_description("Brigadeiro artesanal feito com chocolate belga e finalizado com granulado especial.")
            .with_image(format!("{PHOTOS}/65475/chocolate-dark-coffee-confiserie-65475.jpeg"))
            .with_ingredients(["leite condensado", "chocolate em pó", "manteiga", "granulado"])
            .with_allergens(["leite"])
            .with_nutrition(nutrition(150, 2, 25, 6)),
    ]
}

fn home_address() -> DeliveryAddress {
    DeliveryAddress {
        street: "Rua das Flores".into(),
        number: "123".into(),
        complement: Some("Apto 101".into()),
        neighborhood: "Centro".into(),
        city: "São Paulo".into(),
        state: "SP".into(),
        zip_code: "01001-000".into(),
    }
}

fn order_lines(catalog: &Catalog, spec: &[(&str, u32)]) -> Vec<OrderItem> {
    spec.iter()
        .filter_map(|&(id, quantity)| catalog.get_by_id(id).map(|p| OrderItem { product: p.clone(), quantity, price: p.price() }))
        .collect()
}

/// Mock order history relative to `now`. Lines whose product is missing from the catalog are skipped.
pub fn sample_orders(catalog: &Catalog, now: DateTime<Utc>) -> Vec<Order> {
    vec![
        Order::with_items("ORD123456", order_lines(catalog, &[("1", 10), ("4", 2)]), PaymentMethod::Pix, Decimal::ZERO, now - Duration::minutes(30))
            .with_status(OrderStatus::Ready, PaymentStatus::Paid, now - Duration::minutes(10))
            .with_address(Some(home_address())),
        Order::with_items("ORD123455", order_lines(catalog, &[("2", 1)]), PaymentMethod::Credit, Decimal::ZERO, now - Duration::days(2))
            .with_status(OrderStatus::Delivered, PaymentStatus::Paid, now - Duration::days(2) + Duration::minutes(30))
            .with_address(Some(home_address())),
        Order::with_items("ORD123454", order_lines(catalog, &[("7", 6), ("6", 1)]), PaymentMethod::Pix, Decimal::ZERO, now - Duration::minutes(5))
            .with_pix_code(PIX_CODE)
            .with_address(Some(home_address())),
    ]
}
