use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use log::info;

use crate::handler::{CronHandler, HandlerResponse};

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

async fn run_cron(State(handler): State<CronHandler>) -> HandlerResponse {
    handler.handle().await
}

/// `GET|POST /api/cron` runs one scrape-and-upload.
pub fn router(handler: CronHandler) -> Router {
    Router::new()
        .route("/api/cron", get(run_cron).post(run_cron))
        .with_state(handler)
}

/// Serves the router until the process is stopped.
pub async fn serve(handler: CronHandler, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(handler)).await?;

    Ok(())
}
