use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    pub name: String,
}

pub async fn get_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, name
FROM categories
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// The lowest-id category, used as the service-wide current category.
pub async fn get_first_category(pool: &SqlitePool) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, name
FROM categories
ORDER BY id
LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await
}

pub async fn create_category(pool: &SqlitePool, name: &str) -> anyhow::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
INSERT INTO categories (name) VALUES (?1)
        "#,
    )
    .bind(name)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> anyhow::Result<()> {
    let mut conn = pool.acquire().await?;

    for category in categories {
        sqlx::query(
            r#"
INSERT INTO categories (id, name) VALUES (?1, ?2)
        "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    async fn categories_come_back_ordered_by_id(pool: SqlitePool) {
        create_category(&pool, "Science").await.unwrap();
        create_category(&pool, "Art").await.unwrap();
        create_category(&pool, "History").await.unwrap();

        let categories = get_categories(&pool).await.unwrap();
        assert_eq!(
            categories.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Science", "Art", "History"]
        );
        assert!(categories.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn first_category_is_lowest_id(pool: SqlitePool) {
        assert!(get_first_category(&pool).await.unwrap().is_none());

        let id = create_category(&pool, "Geography").await.unwrap();
        create_category(&pool, "Sports").await.unwrap();

        let first = get_first_category(&pool).await.unwrap().unwrap();
        assert_eq!(first.id, id);
        assert_eq!(first.name, "Geography");
    }
}
