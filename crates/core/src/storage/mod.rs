use anyhow::Context;

/// Opens the shared read-only pool. The two source relations (`top_ctr`,
/// `top_products`) are owned and written by an external daily job; this
/// service never runs DDL against them.
pub async fn connect(database_url: &str) -> anyhow::Result<sqlx::PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("connect DATABASE_URL failed")
}
