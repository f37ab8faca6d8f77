use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::provider::vercel::VercelClient;
use crate::provider::{DomainName, RemoveOutcome, VercelError};

pub struct AppState {
    pub config: Config,
    pub client: VercelClient,
}

#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

#[derive(Deserialize)]
struct KeyQuery {
    key: Option<String>,
}

pub fn create_router(config: Config, client: VercelClient) -> Router {
    let state = Arc::new(AppState { config, client });

    let domains = Router::new()
        .route(
            "/domains/{domain}",
            post(add_domain).get(link_status).delete(remove_domain),
        )
        .route("/domains/{domain}/dns", get(dns_verification))
        .route("/domains/{domain}/verify", post(verify_domain))
        .route("/redeploy", post(redeploy))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_key));

    Router::new()
        .merge(domains)
        .route("/health", get(health_check))
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}

async fn access_log(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    // The access key must not end up in the log.
    let path = request.uri().path().to_string();
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or("-").trim().to_string())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| "-".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let length = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    let duration = start.elapsed();

    // Access log format: method path "user-agent" ip status length duration
    info!(
        target: "access",
        "{} {} \"{}\" {} {} {} {:.3}ms",
        method, path, user_agent, ip, status, length, duration.as_secs_f64() * 1000.0
    );

    response
}

async fn require_key(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyQuery>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(ref config_key) = state.config.server.key {
        let request_key = query.key.as_deref().unwrap_or("");
        if request_key != config_key {
            warn!("Invalid key for {}", request.uri().path());
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    success: false,
                    error: "Invalid key".to_string(),
                }),
            )
                .into_response();
        }
    }

    next.run(request).await
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

async fn add_domain(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Response {
    let domain = match DomainName::parse(&domain) {
        Ok(domain) => domain,
        Err(e) => return error_response(e),
    };

    match state.client.add_domain(&domain).await {
        Ok(added) => success(format!("Added domain {}", domain), added),
        Err(e) => error_response(e),
    }
}

async fn dns_verification(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Response {
    let domain = match DomainName::parse(&domain) {
        Ok(domain) => domain,
        Err(e) => return error_response(e),
    };

    match state.client.dns_verification(&domain).await {
        Ok(config) => success(format!("DNS configuration for {}", domain), config),
        Err(e) => error_response(e),
    }
}

async fn verify_domain(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Response {
    let domain = match DomainName::parse(&domain) {
        Ok(domain) => domain,
        Err(e) => return error_response(e),
    };

    match state.client.verify_domain(&domain).await {
        Ok(verified) => success(format!("Verified domain {}", domain), verified),
        Err(e) => error_response(e),
    }
}

async fn link_status(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Response {
    let domain = match DomainName::parse(&domain) {
        Ok(domain) => domain,
        Err(e) => return error_response(e),
    };

    match state.client.link_status(&domain).await {
        Ok(status) => success(format!("Status of domain {}", domain), status),
        Err(e) => error_response(e),
    }
}

async fn remove_domain(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Response {
    let domain = match DomainName::parse(&domain) {
        Ok(domain) => domain,
        Err(e) => return error_response(e),
    };

    match state.client.remove_domain(&domain).await {
        Ok(outcome) => {
            let message = match outcome {
                RemoveOutcome::Removed => format!("Removed domain {}", domain),
                RemoveOutcome::Protected => format!("Domain {} is protected, skipped", domain),
            };
            success(message, outcome)
        }
        Err(e) => error_response(e),
    }
}

async fn redeploy(State(state): State<Arc<AppState>>) -> Response {
    match state.client.redeploy().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::<()> {
                success: true,
                message: Some("Redeploy triggered".to_string()),
                data: None,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

fn success<T: Serialize>(message: String, data: T) -> Response {
    info!("{}", message);
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            message: Some(message),
            data: Some(data),
        }),
    )
        .into_response()
}

fn error_response(e: VercelError) -> Response {
    let status = match &e {
        VercelError::InvalidDomain(_) => StatusCode::BAD_REQUEST,
        VercelError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        VercelError::Api { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        VercelError::Network(_) | VercelError::Decode(_) => StatusCode::BAD_GATEWAY,
    };

    error!("Request failed: {}", e);
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: e.to_string(),
        }),
    )
        .into_response()
}
