use sqlx::AnyConnection;

use crate::executor::connect;

pub async fn sqlite_memory() -> AnyConnection {
    connect("sqlite::memory:").await.unwrap()
}

pub async fn count_products(conn: &mut AnyConnection) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(conn)
        .await
        .unwrap()
}

/// Inserts a product with only its name, returning the generated id.
pub async fn insert_product(conn: &mut AnyConnection, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO products (name) VALUES (?1) RETURNING id")
        .bind(name)
        .fetch_one(conn)
        .await
        .unwrap()
}
