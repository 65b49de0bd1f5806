//! Checkout and persistence tests against a real PostgreSQL database.
//!
//! Run with `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

use rust_decimal::Decimal;
use uuid::Uuid;

use grocery_backend::config::Config;
use grocery_backend::domain::order::{NO_VALID_ITEMS_MESSAGE, PLACED_BY_CUSTOMER_NOTE};
use grocery_backend::domain::{
    CartItemAdd, CartSync, CartSyncItem, NewAddress, NewProduct, OrderCreate, OrderStatus,
    OrderStatusUpdate, ProductChanges, ProductFilter, QuantityMerge,
};
use grocery_backend::errors::AppError;
use grocery_backend::infra::repositories::ADDRESS_IN_USE_MESSAGE;
use grocery_backend::infra::{Database, Persistence, UnitOfWork};
use grocery_backend::services::{ServiceContainer, Services};
use grocery_backend::types::PageRequest;

async fn connect() -> (Database, Config) {
    let mut config = Config::development();
    config.database_url =
        std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");

    let database = Database::connect(&config).await.unwrap();
    database.seed_postcodes().await.unwrap();
    database.seed_catalog().await.unwrap();
    (database, config)
}

async fn setup() -> Services {
    let (database, config) = connect().await;
    Services::from_connection(database.get_connection(), config)
}

async fn customer(services: &Services) -> Uuid {
    let token = format!("dev_email:{}@example.dk", Uuid::new_v4().simple());
    services.auth().login(&token).await.unwrap().user.id
}

async fn home_address(services: &Services, user_id: Uuid) -> Uuid {
    services
        .addresses()
        .create(
            user_id,
            NewAddress {
                postcode: "2200".into(),
                city: "København".into(),
                street: "Nørrebrogade".into(),
                building: Some("20".into()),
                floor: Some("3".into()),
                apartment: Some("tv".into()),
                instructions: None,
                label: None,
                is_default: false,
            },
        )
        .await
        .unwrap()
        .id
}

async fn any_product(services: &Services) -> Uuid {
    services
        .catalog()
        .list_products(ProductFilter::default(), PageRequest::new(1, 1))
        .await
        .unwrap()
        .items[0]
        .id
}

async fn fresh_product(services: &Services, name: &str) -> Uuid {
    let slug = format!("test-{}", Uuid::new_v4().simple());
    services
        .catalog()
        .create_product(NewProduct {
            sku: slug.to_uppercase(),
            slug,
            name: name.into(),
            description: None,
            price: Decimal::new(1995, 2),
            unit: "stk".into(),
            unit_quantity: Decimal::ONE,
            image_url: None,
            category_id: None,
            is_active: true,
            is_featured: false,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
#[ignore]
async fn test_checkout_snapshots_prices_and_clears_cart() {
    let services = setup().await;
    let user_id = customer(&services).await;
    let address_id = home_address(&services, user_id).await;
    let product_id = fresh_product(&services, "Rugbrød").await;

    let cart = services
        .carts()
        .add_item(user_id, CartItemAdd { product_id, quantity: 3 })
        .await
        .unwrap();

    let detail = services
        .orders()
        .checkout(user_id, OrderCreate { address_id, notes: Some(" ring twice ".into()) })
        .await
        .unwrap();

    assert_eq!(detail.order.status, OrderStatus::Placed);
    assert_eq!(detail.order.invoice_generated_at, Some(detail.order.created_at));
    assert_eq!(detail.order.subtotal, cart.subtotal);
    assert_eq!(detail.order.total, detail.order.subtotal + detail.order.delivery_fee);
    assert_eq!(detail.order.notes.as_deref(), Some("ring twice"));
    assert_eq!(detail.order.address_snapshot.city, "København N");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 3);
    assert_eq!(detail.history.len(), 1);
    assert_eq!(detail.history[0].notes.as_deref(), Some(PLACED_BY_CUSTOMER_NOTE));

    let after = services.carts().view(user_id).await.unwrap();
    assert!(after.items.is_empty());

    // Later price changes leave the order untouched
    services
        .catalog()
        .update_product(
            product_id,
            ProductChanges {
                price: Some(detail.items[0].price_at_purchase + Decimal::ONE),
                ..ProductChanges::default()
            },
        )
        .await
        .unwrap();
    let reloaded = services.orders().get_for_user(user_id, detail.order.id).await.unwrap();
    assert_eq!(reloaded.order.total, detail.order.total);
    assert_eq!(reloaded.items[0].price_at_purchase, detail.items[0].price_at_purchase);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_checkouts_get_distinct_invoice_numbers() {
    let services = setup().await;
    let product_id = any_product(&services).await;

    let mut customers = Vec::new();
    for _ in 0..5 {
        let user_id = customer(&services).await;
        let address_id = home_address(&services, user_id).await;
        services
            .carts()
            .add_item(user_id, CartItemAdd { product_id, quantity: 1 })
            .await
            .unwrap();
        customers.push((user_id, address_id));
    }

    let checkouts = customers.into_iter().map(|(user_id, address_id)| {
        let orders = services.orders();
        async move {
            orders
                .checkout(user_id, OrderCreate { address_id, notes: None })
                .await
        }
    });
    let results = futures::future::join_all(checkouts).await;

    let mut numbers: Vec<String> = results
        .into_iter()
        .map(|result| result.unwrap().order.invoice_number)
        .collect();
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 5);
    assert!(numbers.iter().all(|n| n.starts_with("INV-") && n.len() == 15));
}

#[tokio::test]
#[ignore]
async fn test_failed_checkout_keeps_cart() {
    let services = setup().await;
    let user_id = customer(&services).await;
    let address_id = home_address(&services, user_id).await;

    let product_id = fresh_product(&services, "Udgået vare").await;
    services
        .carts()
        .add_item(user_id, CartItemAdd { product_id, quantity: 2 })
        .await
        .unwrap();
    services.catalog().delete_product(product_id).await.unwrap();

    let err = services
        .orders()
        .checkout(user_id, OrderCreate { address_id, notes: None })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), NO_VALID_ITEMS_MESSAGE);

    services
        .catalog()
        .update_product(
            product_id,
            ProductChanges { is_active: Some(true), ..ProductChanges::default() },
        )
        .await
        .unwrap();
    let cart = services.carts().view(user_id).await.unwrap();
    assert_eq!(cart.item_count, 2);
    let history = services
        .orders()
        .list_for_user(user_id, PageRequest::new(1, 10))
        .await
        .unwrap();
    assert_eq!(history.total, 0);
}

#[tokio::test]
#[ignore]
async fn test_address_used_by_order_cannot_be_deleted() {
    let services = setup().await;
    let user_id = customer(&services).await;
    let address_id = home_address(&services, user_id).await;
    let product_id = any_product(&services).await;

    services
        .carts()
        .add_item(user_id, CartItemAdd { product_id, quantity: 1 })
        .await
        .unwrap();
    services
        .orders()
        .checkout(user_id, OrderCreate { address_id, notes: None })
        .await
        .unwrap();

    let err = services.addresses().delete(user_id, address_id).await.unwrap_err();
    assert_eq!(err.to_string(), ADDRESS_IN_USE_MESSAGE);
    assert!(services.addresses().get(user_id, address_id).await.is_ok());
}

#[tokio::test]
#[ignore]
async fn test_status_workflow_records_history() {
    let services = setup().await;
    let user_id = customer(&services).await;
    let address_id = home_address(&services, user_id).await;
    let product_id = any_product(&services).await;

    services
        .carts()
        .add_item(user_id, CartItemAdd { product_id, quantity: 1 })
        .await
        .unwrap();
    let order_id = services
        .orders()
        .checkout(user_id, OrderCreate { address_id, notes: None })
        .await
        .unwrap()
        .order
        .id;

    let skipped = services
        .orders()
        .update_status(
            order_id,
            OrderStatusUpdate { status: OrderStatus::Delivered, notes: None },
            None,
        )
        .await;
    assert!(matches!(skipped, Err(AppError::BusinessRule(_))));

    let confirmed = services
        .orders()
        .update_status(
            order_id,
            OrderStatusUpdate { status: OrderStatus::Confirmed, notes: Some("Packed by Lars".into()) },
            None,
        )
        .await
        .unwrap();
    assert_eq!(confirmed.order.status, OrderStatus::Confirmed);
    assert_eq!(confirmed.history.len(), 2);
    assert_eq!(confirmed.history[1].status, OrderStatus::Confirmed);
}

#[tokio::test]
#[ignore]
async fn test_adding_same_product_twice_sums_quantities() {
    let services = setup().await;
    let user_id = customer(&services).await;
    let product_id = fresh_product(&services, "Bananer").await;

    for quantity in [2, 3] {
        services
            .carts()
            .add_item(user_id, CartItemAdd { product_id, quantity })
            .await
            .unwrap();
    }

    let cart = services.carts().view(user_id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.subtotal, Decimal::new(9975, 2));
}

#[tokio::test]
#[ignore]
async fn test_sync_keeps_larger_quantity() {
    let services = setup().await;
    let user_id = customer(&services).await;
    let kept = fresh_product(&services, "Mælk").await;
    let raised = fresh_product(&services, "Smør").await;

    for product_id in [kept, raised] {
        services
            .carts()
            .add_item(user_id, CartItemAdd { product_id, quantity: 5 })
            .await
            .unwrap();
    }

    let cart = services
        .carts()
        .sync(
            user_id,
            CartSync {
                items: vec![
                    CartSyncItem { product_id: kept, quantity: 3 },
                    CartSyncItem { product_id: raised, quantity: 7 },
                ],
            },
        )
        .await
        .unwrap();

    let quantity_of = |id: Uuid| {
        cart.items
            .iter()
            .find(|item| item.product_id == id)
            .map(|item| item.quantity)
    };
    assert_eq!(cart.items.len(), 2);
    assert_eq!(quantity_of(kept), Some(5));
    assert_eq!(quantity_of(raised), Some(7));
}

#[tokio::test]
#[ignore]
async fn test_checkout_keeps_quantity_added_after_pricing() {
    let (database, config) = connect().await;
    let uow = Persistence::new(database.get_connection());
    let services = Services::from_connection(database.get_connection(), config);
    let user_id = customer(&services).await;
    let product_id = fresh_product(&services, "Æbler").await;

    services
        .carts()
        .add_item(user_id, CartItemAdd { product_id, quantity: 2 })
        .await
        .unwrap();

    // Another request raises the line while checkout holds what it read
    let pool_carts = uow.carts();
    grocery_backend::with_transaction!(uow, |ctx| {
        let cart_id = ctx
            .carts()
            .lock_for_user(user_id)
            .await?
            .ok_or_else(|| AppError::internal("cart missing"))?;
        let lines = ctx.carts().lines(cart_id).await?;
        pool_carts.upsert_item(cart_id, product_id, 3, QuantityMerge::Sum).await?;
        ctx.carts().remove_lines(&lines).await
    })
    .unwrap();

    let cart = services.carts().view(user_id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
}
