use std::collections::HashMap;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::body::Body;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use axum::Router;
use pipeline::ApiError;
use pipeline::Pipeline;
use pipeline::PipelineRequest;
use pipeline::PipelineResponse;
use pipeline::ResponseBody;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Build the axum application around the pipeline.
///
/// Routing, auth and response shaping all live in the pipeline; axum only
/// owns the transport, so every request funnels through one fallback handler.
pub fn create_router(pipeline: Arc<Pipeline>) -> Router {
    let state = AppState { pipeline };

    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let pipeline_request = match into_pipeline_request(request).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let pipeline_response = state.pipeline.handle(pipeline_request).await;
    into_axum_response(pipeline_response)
}

/// Normalize an axum request into the pipeline's request model.
///
/// Malformed JSON is rejected before the chain runs; an empty body maps to
/// no body at all.
async fn into_pipeline_request(request: Request) -> Result<PipelineRequest, Response> {
    let (parts, body) = request.into_parts();

    let query: HashMap<String, String> = parts
        .uri
        .query()
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();

    let bytes = to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| validation_response("request body could not be read"))?;
    let body = if bytes.is_empty() {
        None
    } else {
        Some(
            serde_json::from_slice(&bytes)
                .map_err(|_| validation_response("request body is not valid JSON"))?,
        )
    };

    Ok(PipelineRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query,
        headers: parts.headers,
        body,
    })
}

fn validation_response(message: &str) -> Response {
    let error = ApiError::validation(message);
    (error.status(), Json(error.to_body(false))).into_response()
}

fn into_axum_response(response: PipelineResponse) -> Response {
    let status = response
        .status()
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match response.body {
        ResponseBody::None => Body::empty(),
        ResponseBody::Json(value) => Body::from(serde_json::to_vec(&value).unwrap_or_default()),
        ResponseBody::Binary { data, .. } => Body::from(data),
    };

    let mut axum_response = Response::new(body);
    *axum_response.status_mut() = status;
    // The pipeline derived Content-Type and friends already.
    *axum_response.headers_mut() = response.headers;
    axum_response
}
