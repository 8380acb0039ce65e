use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use db::Question;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
}

// The by-category listing predates the paged one and kept its singular
// `total_question` field; clients depend on it.
#[derive(Serialize)]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_question: usize,
    current_category: i64,
}

pub(crate) async fn category_map(pool: &SqlitePool) -> Result<BTreeMap<i64, String>, ApiError> {
    let categories = db::categories::get_categories(pool).await?;
    Ok(categories.into_iter().map(|c| (c.id, c.name)).collect())
}

async fn list_categories(
    State(pool): State<SqlitePool>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(&pool).await?,
    }))
}

async fn questions_for_category(
    State(pool): State<SqlitePool>,
    Path(category_id): Path<i64>,
) -> Result<Json<CategoryQuestionsResponse>, ApiError> {
    let questions = db::questions::get_questions_for_category(&pool, category_id).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no questions in category {category_id}"
        )));
    }
    Ok(Json(CategoryQuestionsResponse {
        success: true,
        total_question: questions.len(),
        current_category: category_id,
        questions,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use crate::app::test_util::{seed_category, seed_question, test_server};
    use serde_json::Value;
    use sqlx::SqlitePool;

    #[sqlx::test(migrations = "../db/migrations")]
    #[test_log::test]
    async fn categories_are_returned_as_id_to_name_map(pool: SqlitePool) {
        let science = seed_category(&pool, "Science").await;
        let art = seed_category(&pool, "Art").await;
        let server = test_server(pool).await;

        let response = server.get("/categories").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["categories"][science.to_string()], "Science");
        assert_eq!(body["categories"][art.to_string()], "Art");
    }

    #[sqlx::test(migrations = "../db/migrations")]
    #[test_log::test]
    async fn repeated_category_listings_are_identical(pool: SqlitePool) {
        seed_category(&pool, "Science").await;
        let server = test_server(pool).await;

        let first: Value = server.get("/categories").await.json();
        let second: Value = server.get("/categories").await.json();
        assert_eq!(first, second);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    #[test_log::test]
    async fn category_listing_only_contains_that_category(pool: SqlitePool) {
        let science = seed_category(&pool, "Science").await;
        let art = seed_category(&pool, "Art").await;
        seed_question(&pool, "science q1", "a", science, 1).await;
        seed_question(&pool, "science q2", "a", science, 2).await;
        seed_question(&pool, "art q", "a", art, 1).await;
        let server = test_server(pool).await;

        let response = server.get(&format!("/categories/{science}/questions")).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["total_question"], 2);
        assert_eq!(body["current_category"], science);
        for question in body["questions"].as_array().unwrap() {
            assert_eq!(question["category"], science);
        }
    }

    #[sqlx::test(migrations = "../db/migrations")]
    #[test_log::test]
    async fn empty_category_is_not_found(pool: SqlitePool) {
        seed_category(&pool, "Science").await;
        let server = test_server(pool).await;

        let response = server.get("/categories/999/questions").await;
        response.assert_status_not_found();

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 404);
    }
}
