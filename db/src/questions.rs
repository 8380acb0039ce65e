use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn get_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE category = ?1
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring match on the question text. An empty term
/// matches every question. SQLite's `lower()` folds ASCII only, so terms
/// with non-ASCII letters (e.g. "Österreich") match case-sensitively.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE lower(question) LIKE '%' || lower(?1) || '%'
ORDER BY id
        "#,
    )
    .bind(term)
    .fetch_all(pool)
    .await
}

pub async fn create_question(
    pool: &SqlitePool,
    question: &str,
    answer: &str,
    category: i64,
    difficulty: i64,
) -> anyhow::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question)
    .bind(answer)
    .bind(category)
    .bind(difficulty)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns the number of rows removed, so callers can tell a successful
/// delete from one that lost a race with another writer.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
DELETE FROM questions WHERE id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> anyhow::Result<()> {
    let mut conn = pool.acquire().await?;

    for q in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        )
        .bind(q.id)
        .bind(&q.question)
        .bind(&q.answer)
        .bind(q.category)
        .bind(q.difficulty)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::create_category;

    async fn seed_category(pool: &SqlitePool) -> i64 {
        create_category(pool, "Science").await.unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn questions_are_ordered_by_id(pool: SqlitePool) {
        let cat = seed_category(&pool).await;
        for text in ["one", "two", "three"] {
            create_question(&pool, text, "answer", cat, 1).await.unwrap();
        }

        let questions = get_questions(&pool).await.unwrap();
        assert_eq!(questions.len(), 3);
        assert!(questions.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn lookup_and_delete_round_trip(pool: SqlitePool) {
        let cat = seed_category(&pool).await;
        let id = create_question(&pool, "What is water made of?", "H2O", cat, 2)
            .await
            .unwrap();

        let found = get_question_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(found.answer, "H2O");

        assert_eq!(delete_question(&pool, id).await.unwrap(), 1);
        assert!(get_question_by_id(&pool, id).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_a_missing_row_affects_nothing(pool: SqlitePool) {
        let cat = seed_category(&pool).await;
        create_question(&pool, "keeper", "a", cat, 1).await.unwrap();

        assert_eq!(delete_question(&pool, 12345).await.unwrap(), 0);
        assert_eq!(get_questions(&pool).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn search_is_case_insensitive(pool: SqlitePool) {
        let cat = seed_category(&pool).await;
        create_question(&pool, "What is the boiling point of water?", "100C", cat, 1)
            .await
            .unwrap();
        create_question(&pool, "Who painted the Mona Lisa?", "Da Vinci", cat, 3)
            .await
            .unwrap();

        let hits = search_questions(&pool, "WHAT").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].question.contains("boiling"));

        let all = search_questions(&pool, "").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn category_filter_only_returns_matches(pool: SqlitePool) {
        let science = create_category(&pool, "Science").await.unwrap();
        let art = create_category(&pool, "Art").await.unwrap();
        create_question(&pool, "science q", "a", science, 1).await.unwrap();
        create_question(&pool, "art q", "a", art, 1).await.unwrap();

        let hits = get_questions_for_category(&pool, art).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].question, "art q");

        let none = get_questions_for_category(&pool, 999).await.unwrap();
        assert!(none.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_rejects_unknown_category(pool: SqlitePool) {
        let result = create_question(&pool, "orphan", "a", 42, 1).await;
        assert!(result.is_err());
    }
}
