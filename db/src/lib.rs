pub mod categories;
pub mod questions;

pub use categories::Category;
pub use questions::Question;

use sqlx::sqlite::SqlitePool;

pub async fn establish_connection(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    SqlitePool::connect(database_url).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
