use super::types::{
    ANALYSIS_FAILED, ASSET_NAME_REQUIRED, AnalysisRequest, ErrorResponse, STATUS_MESSAGE,
    StatusResponse,
};
use crate::relay::{ClientEvent, StreamRelay};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{
        IntoResponse, Json, Response,
        sse::{Event, Sse},
    },
};
use futures::StreamExt;
use std::{convert::Infallible, sync::Arc};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<StreamRelay>,
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

pub async fn status() -> Json<Vec<StatusResponse>> {
    Json(vec![StatusResponse {
        message: STATUS_MESSAGE.to_string(),
    }])
}

pub async fn build(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Response, ErrorReply> {
    // A body we cannot read carries no asset name
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Unreadable /build body: {}", rejection.body_text());
            AnalysisRequest::default()
        }
    };

    let asset_name = request.asset_name().map_err(|e| {
        warn!("Rejected analysis request: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: ASSET_NAME_REQUIRED.to_string(),
                details: None,
            }),
        )
    })?;

    info!("Received analysis request for asset: {}", asset_name);

    let primed = state.relay.open(asset_name).await.map_err(|e| {
        error!("AI stream error for {}: {}", asset_name, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: ANALYSIS_FAILED.to_string(),
                details: Some(e.message()),
            }),
        )
    })?;

    let events = primed
        .into_events()
        .map(|event| Ok::<_, Infallible>(sse_event(&event)));

    Ok((
        [(header::CONNECTION, "keep-alive")],
        Sse::new(events),
    )
        .into_response())
}

/// SSE field values cannot hold a bare `\r`; a multi-line payload becomes
/// one `data:` line per line.
fn sse_event(event: &ClientEvent) -> Event {
    let payload = event.payload().replace("\r\n", "\n").replace('\r', "\n");
    Event::default().data(payload)
}

