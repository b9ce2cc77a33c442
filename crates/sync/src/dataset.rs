//! Synthetic dataset used in demo mode and as the read fallback.
//!
//! The fixtures are shaped exactly like mapped backend rows so the dashboard
//! cannot tell them apart. Nothing here is persisted.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use siteline_core::{
    CurrencyCode, Customer, Order, OrderItem, OrderStatus, Product, ProductCategory, Project,
    ProjectStatus,
};

/// In-memory collections, one per entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyntheticDataset {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub projects: Vec<Project>,
    pub customers: Vec<Customer>,
}

fn at(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).single()
}

fn day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

impl SyntheticDataset {
    /// The demo fixtures.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            products: seed_products(),
            orders: seed_orders(),
            projects: seed_projects(),
            customers: seed_customers(),
        }
    }

    /// Total number of rows across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len() + self.orders.len() + self.projects.len() + self.customers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: "prod-001".to_string(),
            name: "Portland Cement 25kg".to_string(),
            description: "General purpose cement for footings and slabs".to_string(),
            category: ProductCategory::Materials,
            price: Decimal::new(1240, 2),
            currency: CurrencyCode::USD,
            stock: 180,
            sku: Some("MAT-CEM-25".to_string()),
            image_url: None,
            active: true,
            created_at: at(2025, 11, 3),
        },
        Product {
            id: "prod-002".to_string(),
            name: "Rebar #4, 20ft".to_string(),
            description: "Grade 60 deformed steel bar".to_string(),
            category: ProductCategory::Materials,
            price: Decimal::new(1895, 2),
            currency: CurrencyCode::USD,
            stock: 420,
            sku: Some("MAT-RB4-20".to_string()),
            image_url: None,
            active: true,
            created_at: at(2025, 11, 3),
        },
        Product {
            id: "prod-003".to_string(),
            name: "Plate Compactor Rental (day)".to_string(),
            description: "Gas plate compactor, delivered to site".to_string(),
            category: ProductCategory::Equipment,
            price: Decimal::new(8500, 2),
            currency: CurrencyCode::USD,
            stock: 4,
            sku: Some("EQP-PC-DAY".to_string()),
            image_url: None,
            active: true,
            created_at: at(2025, 12, 1),
        },
        Product {
            id: "prod-004".to_string(),
            name: "Laser Level Kit".to_string(),
            description: "Rotary laser with tripod and grade rod".to_string(),
            category: ProductCategory::Tools,
            price: Decimal::new(64900, 2),
            currency: CurrencyCode::USD,
            stock: 7,
            sku: Some("TLS-LL-KIT".to_string()),
            image_url: None,
            active: true,
            created_at: at(2026, 1, 14),
        },
        Product {
            id: "prod-005".to_string(),
            name: "Site Survey".to_string(),
            description: "Half-day topographic survey".to_string(),
            category: ProductCategory::Services,
            price: Decimal::new(45000, 2),
            currency: CurrencyCode::USD,
            stock: 0,
            sku: None,
            image_url: None,
            active: false,
            created_at: at(2026, 2, 2),
        },
    ]
}

fn seed_orders() -> Vec<Order> {
    let cement_and_rebar = vec![
        OrderItem {
            product_id: "prod-001".to_string(),
            name: "Portland Cement 25kg".to_string(),
            quantity: 40,
            unit_price: Decimal::new(1240, 2),
        },
        OrderItem {
            product_id: "prod-002".to_string(),
            name: "Rebar #4, 20ft".to_string(),
            quantity: 60,
            unit_price: Decimal::new(1895, 2),
        },
    ];
    let compactor = vec![OrderItem {
        product_id: "prod-003".to_string(),
        name: "Plate Compactor Rental (day)".to_string(),
        quantity: 3,
        unit_price: Decimal::new(8500, 2),
    }];
    let laser = vec![OrderItem {
        product_id: "prod-004".to_string(),
        name: "Laser Level Kit".to_string(),
        quantity: 1,
        unit_price: Decimal::new(64900, 2),
    }];

    let order = |id: &str,
                 number: &str,
                 customer: (&str, &str),
                 items: Vec<OrderItem>,
                 status: OrderStatus,
                 created_at: Option<DateTime<Utc>>| {
        let mut order = Order {
            id: id.to_string(),
            order_number: number.to_string(),
            customer_id: Some(customer.0.to_string()),
            customer_name: customer.1.to_string(),
            items,
            total: Decimal::ZERO,
            currency: CurrencyCode::USD,
            status,
            created_at,
        };
        order.total = order.items_total();
        order
    };

    vec![
        order(
            "ord-1001",
            "SO-1001",
            ("cust-001", "Harbor Works"),
            cement_and_rebar,
            OrderStatus::Delivered,
            at(2026, 1, 20),
        ),
        order(
            "ord-1002",
            "SO-1002",
            ("cust-002", "Greenline Landscaping"),
            compactor,
            OrderStatus::Processing,
            at(2026, 2, 11),
        ),
        order(
            "ord-1003",
            "SO-1003",
            ("cust-003", "Mesa Builders"),
            laser,
            OrderStatus::Pending,
            at(2026, 3, 1),
        ),
    ]
}

fn seed_projects() -> Vec<Project> {
    vec![
        Project {
            id: "proj-01".to_string(),
            name: "Dock Extension".to_string(),
            client_name: "Harbor Works".to_string(),
            site_address: Some("Pier 9, Harbor Rd".to_string()),
            status: ProjectStatus::InProgress,
            budget: Decimal::new(48_000, 0),
            currency: CurrencyCode::USD,
            progress: 35,
            start_date: day(2026, 2, 1),
            due_date: day(2026, 6, 30),
        },
        Project {
            id: "proj-02".to_string(),
            name: "Community Garden Grading".to_string(),
            client_name: "Greenline Landscaping".to_string(),
            site_address: Some("14 Orchard Ln".to_string()),
            status: ProjectStatus::Planning,
            budget: Decimal::new(12_500, 0),
            currency: CurrencyCode::USD,
            progress: 0,
            start_date: day(2026, 5, 4),
            due_date: None,
        },
        Project {
            id: "proj-03".to_string(),
            name: "Warehouse Slab Repair".to_string(),
            client_name: "Mesa Builders".to_string(),
            site_address: None,
            status: ProjectStatus::Completed,
            budget: Decimal::new(21_750, 0),
            currency: CurrencyCode::USD,
            progress: 100,
            start_date: day(2025, 10, 6),
            due_date: day(2025, 12, 19),
        },
    ]
}

fn seed_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "cust-001".to_string(),
            name: "Dana Ortiz".to_string(),
            email: Some("dana@harborworks.example".to_string()),
            phone: Some("+1 555 0142".to_string()),
            company: Some("Harbor Works".to_string()),
            total_spent: Decimal::new(163_300, 2),
            created_at: at(2025, 9, 12),
        },
        Customer {
            id: "cust-002".to_string(),
            name: "Sam Whitaker".to_string(),
            email: Some("sam@greenline.example".to_string()),
            phone: None,
            company: Some("Greenline Landscaping".to_string()),
            total_spent: Decimal::new(25_500, 2),
            created_at: at(2025, 10, 2),
        },
        Customer {
            id: "cust-003".to_string(),
            name: "Priya Natarajan".to_string(),
            email: Some("priya@mesabuilders.example".to_string()),
            phone: Some("+1 555 0199".to_string()),
            company: Some("Mesa Builders".to_string()),
            total_spent: Decimal::ZERO,
            created_at: at(2026, 1, 8),
        },
    ]
}
