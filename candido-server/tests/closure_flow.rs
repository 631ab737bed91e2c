//! Closure-consistency integration tests
//!
//! These run against a real PostgreSQL instance and are ignored by
//! default. Point DATABASE_URL at a scratch database and run with
//! `cargo test -- --ignored`.

use candido_server::db;
use candido_server::error::ServiceError;
use shared::error::ErrorCode;
use shared::models::{
    Client, ClientCreate, ClientKind, ClosureCreate, Material, MaterialCreate, OrderCreate,
    OrderPatch, OrderStatus, Vehicle, VehicleCreate,
};
use sqlx::PgPool;

async fn setup() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB tests");
    let pool = PgPool::connect(&url).await.expect("connect");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrate");
    pool
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", rand::random::<u64>())
}

async fn seed_client(pool: &PgPool) -> Client {
    db::clients::create(
        pool,
        &ClientCreate {
            kind: ClientKind::PessoaFisica,
            name: unique("client"),
            cpf: None,
            razao_social: None,
            cnpj: None,
            inscricao_estadual: None,
            address: None,
            phone: None,
            email: None,
        },
    )
    .await
    .expect("create client")
}

async fn seed_material(pool: &PgPool, price_m3: f64) -> Material {
    db::materials::create(
        pool,
        &MaterialCreate {
            name: unique("material"),
            price_m3: Some(price_m3),
        },
    )
    .await
    .expect("create material")
}

async fn seed_vehicle(pool: &PgPool, client_id: i64, quantity_m3: f64) -> Vehicle {
    db::vehicles::create(
        pool,
        &VehicleCreate {
            client_id,
            plate: unique("plt"),
            quantity_m3: Some(quantity_m3),
        },
    )
    .await
    .expect("create vehicle")
}

async fn seed_order(
    pool: &PgPool,
    client_id: i64,
    material_id: i64,
    quantity: f64,
    unit_price: f64,
) -> shared::models::Order {
    db::orders::create(
        pool,
        &OrderCreate {
            client_id,
            material_id,
            unit_price: Some(unit_price),
            quantity: Some(quantity),
            vehicle_id: None,
            closure_id: None,
            status: None,
        },
    )
    .await
    .expect("create order")
}

async fn closure_total(pool: &PgPool, id: i64) -> f64 {
    let (total,): (f64,) = sqlx::query_as("SELECT total FROM closures WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("closure total");
    total
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn closure_total_matches_member_sum() {
    let pool = setup().await;
    let client = seed_client(&pool).await;
    let material = seed_material(&pool, 85.0).await;

    let a = seed_order(&pool, client.id, material.id, 6.0, 50.0).await;
    let b = seed_order(&pool, client.id, material.id, 3.0, 50.0).await;

    let closure = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: Some("weekly batch".into()),
            order_ids: vec![a.id, b.id],
        },
    )
    .await
    .expect("create closure");

    assert_eq!(closure.closure.total, 300.0 + 150.0);
    assert_eq!(closure.orders.len(), 2);
    assert!(closure
        .orders
        .iter()
        .all(|o| o.status == OrderStatus::InClosure));
    assert_eq!(closure_total(&pool, closure.closure.id).await, 450.0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn reassignment_recomputes_both_closures() {
    let pool = setup().await;
    let client = seed_client(&pool).await;
    let material = seed_material(&pool, 85.0).await;

    let a = seed_order(&pool, client.id, material.id, 6.0, 50.0).await; // 300
    let b = seed_order(&pool, client.id, material.id, 10.0, 50.0).await; // 500

    let closure_a = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: None,
            order_ids: vec![a.id],
        },
    )
    .await
    .expect("closure a");
    let closure_b = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: None,
            order_ids: vec![b.id],
        },
    )
    .await
    .expect("closure b");

    let moved = db::orders::update(
        &pool,
        a.id,
        &OrderPatch {
            closure_id: Some(Some(closure_b.closure.id)),
            ..Default::default()
        },
    )
    .await
    .expect("move order");

    assert_eq!(moved.closure_id, Some(closure_b.closure.id));
    assert_eq!(closure_total(&pool, closure_a.closure.id).await, 0.0);
    assert_eq!(closure_total(&pool, closure_b.closure.id).await, 800.0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn member_deletion_shrinks_closure_total() {
    let pool = setup().await;
    let client = seed_client(&pool).await;
    let material = seed_material(&pool, 85.0).await;

    let a = seed_order(&pool, client.id, material.id, 2.0, 60.0).await; // 120
    let b = seed_order(&pool, client.id, material.id, 5.5, 60.0).await; // 330

    let closure = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: None,
            order_ids: vec![a.id, b.id],
        },
    )
    .await
    .expect("create closure");
    assert_eq!(closure.closure.total, 450.0);

    db::orders::delete(&pool, a.id).await.expect("delete order");

    let total = closure_total(&pool, closure.closure.id).await;
    assert_eq!(total, 330.0);

    // The stored total agrees with a fresh resummation
    let (resum,): (f64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total_value), 0) FROM orders WHERE closure_id = $1",
    )
    .bind(closure.closure.id)
    .fetch_one(&pool)
    .await
    .expect("resum");
    assert_eq!(total, resum);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn finalize_settles_members_and_is_idempotent() {
    let pool = setup().await;
    let client = seed_client(&pool).await;
    let material = seed_material(&pool, 85.0).await;

    let a = seed_order(&pool, client.id, material.id, 1.0, 10.0).await;
    let b = seed_order(&pool, client.id, material.id, 2.0, 10.0).await;
    let c = seed_order(&pool, client.id, material.id, 3.0, 10.0).await;
    let outsider = seed_order(&pool, client.id, material.id, 4.0, 10.0).await;

    let closure = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: None,
            order_ids: vec![a.id, b.id, c.id],
        },
    )
    .await
    .expect("create closure");

    let settled = db::closures::finalize(&pool, closure.closure.id)
        .await
        .expect("finalize");
    assert_eq!(settled.status, shared::models::ClosureStatus::Settled);

    for id in [a.id, b.id, c.id] {
        let order = db::orders::find_by_id(&pool, id)
            .await
            .expect("find")
            .expect("order");
        assert_eq!(order.status, OrderStatus::Paid);
    }
    let untouched = db::orders::find_by_id(&pool, outsider.id)
        .await
        .expect("find")
        .expect("order");
    assert_eq!(untouched.status, OrderStatus::Pending);

    // Settling again is a no-op, not an error
    let again = db::closures::finalize(&pool, closure.closure.id)
        .await
        .expect("finalize again");
    assert_eq!(again.status, shared::models::ClosureStatus::Settled);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn closure_deletion_detaches_members() {
    let pool = setup().await;
    let client = seed_client(&pool).await;
    let material = seed_material(&pool, 85.0).await;

    let a = seed_order(&pool, client.id, material.id, 1.0, 10.0).await;
    let b = seed_order(&pool, client.id, material.id, 2.0, 10.0).await;

    let closure = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: None,
            order_ids: vec![a.id, b.id],
        },
    )
    .await
    .expect("create closure");

    db::closures::delete(&pool, closure.closure.id)
        .await
        .expect("delete closure");

    for id in [a.id, b.id] {
        let order = db::orders::find_by_id(&pool, id)
            .await
            .expect("find")
            .expect("order survives");
        assert_eq!(order.closure_id, None);
        assert_eq!(order.status, OrderStatus::Pending);
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn recompute_is_idempotent_without_mutation() {
    let pool = setup().await;
    let client = seed_client(&pool).await;
    let material = seed_material(&pool, 85.0).await;

    let a = seed_order(&pool, client.id, material.id, 2.0, 60.0).await; // 120
    let b = seed_order(&pool, client.id, material.id, 5.5, 60.0).await; // 330

    let closure = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: None,
            order_ids: vec![a.id, b.id],
        },
    )
    .await
    .expect("create closure");

    // A no-op patch still runs the recompute path; doing it twice in a
    // row must land on the same total both times
    for _ in 0..2 {
        db::orders::update(&pool, a.id, &OrderPatch::default())
            .await
            .expect("no-op patch");
        assert_eq!(closure_total(&pool, closure.closure.id).await, 450.0);
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn paid_members_keep_status_across_batch_reassignment() {
    let pool = setup().await;
    let client = seed_client(&pool).await;
    let material = seed_material(&pool, 85.0).await;

    let order = seed_order(&pool, client.id, material.id, 4.0, 50.0).await; // 200

    let first = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: None,
            order_ids: vec![order.id],
        },
    )
    .await
    .expect("first closure");
    db::closures::finalize(&pool, first.closure.id)
        .await
        .expect("finalize");

    let second = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: None,
            order_ids: vec![order.id],
        },
    )
    .await
    .expect("second closure");

    let moved = db::orders::find_by_id(&pool, order.id)
        .await
        .expect("find")
        .expect("order");
    assert_eq!(moved.closure_id, Some(second.closure.id));
    assert_eq!(moved.status, OrderStatus::Paid);
    assert_eq!(closure_total(&pool, first.closure.id).await, 0.0);
    assert_eq!(closure_total(&pool, second.closure.id).await, 200.0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn dangling_material_fails_before_persisting() {
    let pool = setup().await;
    let client = seed_client(&pool).await;

    let (before,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE client_id = $1")
        .bind(client.id)
        .fetch_one(&pool)
        .await
        .expect("count");

    let err = db::orders::create(
        &pool,
        &OrderCreate {
            client_id: client.id,
            material_id: i64::MAX,
            unit_price: Some(10.0),
            quantity: Some(1.0),
            vehicle_id: None,
            closure_id: None,
            status: None,
        },
    )
    .await
    .expect_err("dangling material must fail");
    match err {
        ServiceError::App(app) => assert_eq!(app.code, ErrorCode::MaterialNotFound),
        other => panic!("unexpected error: {other:?}"),
    }

    let (after,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE client_id = $1")
        .bind(client.id)
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(before, after);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn closure_with_no_matching_orders_is_rejected() {
    let pool = setup().await;
    let client = seed_client(&pool).await;

    let err = db::closures::create(
        &pool,
        &ClosureCreate {
            client_id: client.id,
            description: None,
            order_ids: vec![i64::MAX],
        },
    )
    .await
    .expect_err("no matching orders");
    match err {
        ServiceError::App(app) => assert_eq!(app.code, ErrorCode::ClosureEmpty),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn order_values_fall_back_to_references() {
    let pool = setup().await;
    let client = seed_client(&pool).await;
    let material = seed_material(&pool, 85.0).await;
    let vehicle = seed_vehicle(&pool, client.id, 6.0).await;

    let order = db::orders::create(
        &pool,
        &OrderCreate {
            client_id: client.id,
            material_id: material.id,
            unit_price: None,
            quantity: None,
            vehicle_id: Some(vehicle.id),
            closure_id: None,
            status: None,
        },
    )
    .await
    .expect("create order");

    assert_eq!(order.unit_price, 85.0);
    assert_eq!(order.quantity, 6.0);
    assert_eq!(order.total_value, 6.0 * 85.0);
}
