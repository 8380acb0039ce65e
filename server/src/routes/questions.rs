use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use db::{Category, Question};

use crate::app::AppState;
use crate::error::ApiError;

use super::category_map;

const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default = "default_page")]
    page: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Deserialize)]
struct NewQuestion {
    question: String,
    answer: String,
    category: i64,
    difficulty: i64,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm", default)]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPageResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: BTreeMap<i64, String>,
    current_category: Category,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    deleted: i64,
    questions: Vec<Question>,
}

#[derive(Serialize)]
struct CreateResponse {
    success: bool,
    created: i64,
    questions: Vec<Question>,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
}

/// 1-based page slice of the id-ordered question list. Page 0 and pages past
/// the end come back empty, including page numbers whose offset would not
/// fit in a usize.
fn paginate(all: &[Question], page: usize) -> &[Question] {
    let Some(start) = page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE))
    else {
        return &[];
    };
    if start >= all.len() {
        return &[];
    }
    let end = (start + QUESTIONS_PER_PAGE).min(all.len());
    &all[start..end]
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    State(current_category): State<Category>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<QuestionsPageResponse>, ApiError> {
    let Query(PageQuery { page }) = query?;
    let all = db::questions::get_questions(&pool).await?;

    let current = paginate(&all, page);
    if current.is_empty() {
        return Err(ApiError::NotFound(format!("no questions on page {page}")));
    }

    Ok(Json(QuestionsPageResponse {
        success: true,
        questions: current.to_vec(),
        total_questions: all.len(),
        categories: category_map(&pool).await?,
        current_category,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let question = db::questions::get_question_by_id(&pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("question {id} does not exist")))?;

    let removed = db::questions::delete_question(&pool, question.id)
        .await
        .map_err(|error| {
            tracing::error!("failed to delete question {id}: {error}");
            ApiError::Unprocessable(format!("could not delete question {id}"))
        })?;
    // Another writer may have removed the row between the lookup and the
    // delete; zero affected rows means it was already gone.
    if removed == 0 {
        return Err(ApiError::NotFound(format!("question {id} does not exist")));
    }

    let remaining = db::questions::get_questions(&pool).await?;
    Ok(Json(DeleteResponse {
        success: true,
        deleted: question.id,
        questions: paginate(&remaining, 1).to_vec(),
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<NewQuestion>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let Json(new) = body?;
    if new.question.trim().is_empty() {
        return Err(ApiError::Unprocessable(
            "field `question` must not be empty".to_owned(),
        ));
    }
    if new.answer.trim().is_empty() {
        return Err(ApiError::Unprocessable(
            "field `answer` must not be empty".to_owned(),
        ));
    }

    let created = db::questions::create_question(
        &pool,
        &new.question,
        &new.answer,
        new.category,
        new.difficulty,
    )
    .await
    .map_err(|error| {
        tracing::error!("failed to insert question: {error}");
        ApiError::Unprocessable("could not create question".to_owned())
    })?;

    let all = db::questions::get_questions(&pool).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            success: true,
            created,
            questions: paginate(&all, 1).to_vec(),
        }),
    ))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(SearchBody { search_term }) = body?;
    let questions = db::questions::search_questions(&pool, &search_term).await?;
    Ok(Json(SearchResponse {
        success: true,
        total_questions: questions.len(),
        questions,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/search", post(search_questions))
        .with_state(state)
}
