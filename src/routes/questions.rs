use axum::{extract::State, response::Json};

use crate::{
    dto::question_dto::{QuestionListQuery, QuestionListResponse, QuestionView},
    error::Result,
    extract::{ApiPath, ApiQuery},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/questionlist/",
    params(
        ("difficulty" = Option<String>, Query, description = "easy, medium or hard (case-insensitive)"),
        ("category_id" = Option<i64>, Query, description = "Category id")
    ),
    responses(
        (status = 200, description = "Active questions matching the filters", body = QuestionListResponse),
        (status = 400, description = "Malformed filter"),
        (status = 404, description = "Unknown category")
    )
)]
#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<QuestionListQuery>,
) -> Result<Json<QuestionListResponse>> {
    let questions: Vec<QuestionView> = state
        .question_service
        .list(&query)
        .await?
        .into_iter()
        .map(QuestionView::from)
        .collect();
    Ok(Json(QuestionListResponse {
        count: questions.len(),
        questions,
    }))
}

#[utoipa::path(
    get,
    path = "/api/question-detail/{id}/",
    params(("id" = i64, Path, description = "Question id")),
    responses(
        (status = 200, description = "Question detail", body = QuestionView),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn question_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<QuestionView>> {
    let question = state.question_service.get(id).await?;
    Ok(Json(QuestionView::from(question)))
}
