use super::model::{CreateEmployeeRequest, Employee};
use crate::AppState;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use bankapp_problem::Result;
use bankapp_problem::pipe::{ParseIntPipe, Pipe, ValidatedJson};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(get_one))
}

async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateEmployeeRequest>,
) -> Result<Json<Employee>> {
    state.employees.create(req).map(Json)
}

async fn get_one(State(state): State<AppState>, Path(raw_id): Path<String>) -> Result<Json<Employee>> {
    let id = ParseIntPipe.transform(raw_id).await?;
    state.employees.get(id).map(Json)
}
