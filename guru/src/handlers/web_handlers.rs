use crate::database::Database;
use crate::error::AppError;
use crate::models::{AnsweredQuestion, LatestResponse, ServerStatus};
use crate::xmpp::XmppSender;
use actix_web::{web, HttpResponse, Result};
use std::sync::Arc;
use std::time::SystemTime;

/// How many answered questions the landing listing returns.
const LATEST_LIMIT: u32 = 20;

pub struct AppState {
    pub database: Arc<Database>,
    pub xmpp: Arc<dyn XmppSender>,
    pub start_time: SystemTime,
}

pub async fn health_check(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let uptime = data
        .start_time
        .elapsed()
        .map_err(|e| AppError::Internal(format!("Failed to calculate uptime: {e}")))?
        .as_secs();

    let status = ServerStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime,
    };

    Ok(HttpResponse::Ok().json(status))
}

/// The most recently answered questions, newest first, without the
/// askers' or answerers' addresses.
pub async fn latest_questions(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let questions = data.database.latest_answered(LATEST_LIMIT)?;

    let response = LatestResponse {
        questions: questions.into_iter().map(AnsweredQuestion::from).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}
