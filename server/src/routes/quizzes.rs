use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use db::Question;

use crate::app::AppState;
use crate::error::ApiError;
use crate::telemetry::QUIZ_QUESTION_CNTR;

/// Category id 0 selects from every category.
const ANY_CATEGORY: i64 = 0;

#[derive(Deserialize)]
struct QuizBody {
    quiz_category: QuizCategory,
}

#[derive(Deserialize)]
struct QuizCategory {
    id: i64,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: Question,
}

async fn quiz_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> Result<Json<QuizResponse>, ApiError> {
    let Json(body) = body?;
    let category = body.quiz_category.id;

    let candidates = if category == ANY_CATEGORY {
        db::questions::get_questions(&pool).await?
    } else {
        db::questions::get_questions_for_category(&pool, category).await?
    };

    // Draws are independent; previously served questions stay in the pool.
    let question = candidates
        .choose(&mut rand::rng())
        .cloned()
        .ok_or_else(|| ApiError::NotFound("no questions available for this quiz".to_owned()))?;

    QUIZ_QUESTION_CNTR
        .with_label_values(&[&question.category.to_string()])
        .inc();

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(quiz_question))
        .with_state(state)
}
