//! Fixture builders shared by unit tests

use rust_decimal::Decimal;
use shared::models::{
    Order, OrderStatus, PricedLine, Product, Role, SizeVariant, ToppingVariant, User, UserStatus,
};

pub fn seller(id: &str, name: &str) -> User {
    User {
        id: id.into(),
        name: name.into(),
        email: None,
        phone: None,
        avatar: None,
        role: Role::Seller,
        status: UserStatus::Active,
        is_open: true,
        is_deleted: false,
        location_id: Some(format!("loc-{}", id)),
        expo_push_token: None,
        created_at: 0,
    }
}

pub fn customer(id: &str) -> User {
    User {
        role: Role::Customer,
        location_id: None,
        ..seller(id, id)
    }
}

/// Product with sizes M (+0, default) / L (+5000) and toppings t1 (+2000) / t2 (+3000)
pub fn product(id: &str, seller_id: &str, base: i64) -> Product {
    Product {
        id: id.into(),
        name: format!("Product {}", id),
        description: String::new(),
        image: None,
        base_price: Decimal::from(base),
        sizes: vec![
            SizeVariant {
                id: "M".into(),
                name: "Medium".into(),
                price: Decimal::ZERO,
                is_default: true,
            },
            SizeVariant {
                id: "L".into(),
                name: "Large".into(),
                price: Decimal::from(5000),
                is_default: false,
            },
        ],
        toppings: vec![
            ToppingVariant {
                id: "t1".into(),
                name: "Pearl".into(),
                price: Decimal::from(2000),
            },
            ToppingVariant {
                id: "t2".into(),
                name: "Pudding".into(),
                price: Decimal::from(3000),
            },
        ],
        in_stock: true,
        is_deleted: false,
        seller_id: seller_id.into(),
        category_id: "drinks".into(),
        sold: 0,
        created_at: 0,
    }
}

pub fn plain_line(line_id: &str, product_id: &str, unit: i64, quantity: u32) -> PricedLine {
    let unit = Decimal::from(unit);
    PricedLine {
        line_id: line_id.into(),
        product_id: product_id.into(),
        product_name: product_id.into(),
        image: None,
        base_price: unit,
        size: None,
        toppings: vec![],
        quantity,
        unit_price: unit,
        line_total: unit * Decimal::from(quantity),
    }
}

/// Completed order with one line (qty 1) per product
pub fn completed_order(id: &str, customer_id: &str, seller_id: &str, products: &[&str]) -> Order {
    let items: Vec<PricedLine> = products
        .iter()
        .enumerate()
        .map(|(i, p)| plain_line(&format!("{}-{}", id, i), p, 10000, 1))
        .collect();
    let items_total: Decimal = items.iter().map(|l| l.line_total).sum();
    Order {
        id: id.into(),
        order_no: 1,
        customer_id: customer_id.into(),
        seller_id: seller_id.into(),
        items,
        status: OrderStatus::Completed,
        delivery_location_id: "loc-d".into(),
        receiver_name: String::new(),
        receiver_phone: String::new(),
        note: String::new(),
        distance: 1.0,
        shipping_cost: Decimal::from(4000),
        items_total,
        total_with_shipping: items_total + Decimal::from(4000),
        is_deleted: false,
        created_at: 0,
        updated_at: 0,
        delivered_at: Some(0),
    }
}
