//! Result submission and retrieval handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quizbox_store::{ResultRecord, StoreError};

use crate::AppState;

pub const SAVED: &str = "Resultados salvos com sucesso!";
pub const READ_FAILED_ON_SAVE: &str = "Erro interno do servidor ao ler dados.";
pub const WRITE_FAILED_ON_SAVE: &str = "Erro interno do servidor ao salvar dados.";
pub const NOT_FOUND: &str = "Arquivo de respostas não encontrado.";
pub const READ_FAILED: &str = "Erro interno do servidor.";

/// `POST /save-results`
pub async fn save_results(
    State(state): State<AppState>,
    Json(record): Json<ResultRecord>,
) -> (StatusCode, &'static str) {
    let store = Arc::clone(&state.store);
    let outcome = tokio::task::spawn_blocking(move || store.append(record)).await;

    match outcome {
        Ok(Ok(count)) => {
            log::info!("saved result ({count} stored)");
            (StatusCode::OK, SAVED)
        }
        Ok(Err(e)) => {
            log::error!("POST /save-results: {} failed: {e}", e.operation());
            (StatusCode::INTERNAL_SERVER_ERROR, save_failure_message(&e))
        }
        Err(e) => {
            log::error!("POST /save-results: append task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, WRITE_FAILED_ON_SAVE)
        }
    }
}

fn save_failure_message(err: &StoreError) -> &'static str {
    match err {
        StoreError::Read { .. } | StoreError::Corrupt { .. } | StoreError::NotFound { .. } => {
            READ_FAILED_ON_SAVE
        }
        StoreError::Init { .. } | StoreError::Write { .. } | StoreError::Encode { .. } => {
            WRITE_FAILED_ON_SAVE
        }
    }
}

/// `GET /respostas.json`
pub async fn get_results(State(state): State<AppState>) -> Response {
    let store = Arc::clone(&state.store);
    let outcome = tokio::task::spawn_blocking(move || store.load_all()).await;

    match outcome {
        Ok(Ok(records)) => Json(records).into_response(),
        Ok(Err(e)) if e.is_not_found() => {
            log::debug!("GET /respostas.json: {e}");
            (StatusCode::NOT_FOUND, NOT_FOUND).into_response()
        }
        Ok(Err(e)) => {
            log::error!("GET /respostas.json: {} failed: {e}", e.operation());
            (StatusCode::INTERNAL_SERVER_ERROR, READ_FAILED).into_response()
        }
        Err(e) => {
            log::error!("GET /respostas.json: load task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, READ_FAILED).into_response()
        }
    }
}

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}
