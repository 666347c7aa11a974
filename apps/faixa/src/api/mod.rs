//! # Faixa HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /students` - List registered students
//! - `POST /students` - Register a student
//! - `GET /students/{id}` - Get a student's graduation state
//! - `GET /students/{id}/eligibility` - Evaluate promotion eligibility
//! - `POST /students/{id}/attendance` - Record a scheduled class
//! - `GET /students/{id}/promotions` - Promotion history
//! - `POST /students/{id}/promotions` - Record an approved promotion
//! - `POST /students/{id}/degree` - Set the degree count
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `FAIXA_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `FAIXA_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `FAIXA_API_KEY`: If set, requires Bearer token authentication

mod access;
mod handlers;
mod types;

// Re-exports for external use
pub use access::AccessPolicy;
// Re-export handlers and types for integration tests (via `faixa::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    attendance_handler, degree_handler, eligibility_handler, health_handler, history_handler,
    list_students_handler, promote_handler, register_handler, student_handler,
};
#[allow(unused_imports)]
pub use types::{
    AttendanceRequest, AttendanceResponse, DegreeRequest, EligibilityResponse, HealthResponse,
    HistoryResponse, PromoteRequest, PromoteResponse, PromotionJson, RegisterRequest, StudentJson,
    StudentResponse, StudentsResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use faixa_core::{FaixaError, Session};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the graduation session.
#[derive(Clone)]
pub struct AppState {
    /// The session over the graduation store.
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    /// Create new app state with a session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `FAIXA_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("FAIXA_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (FAIXA_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            // Parse comma-separated origins
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in FAIXA_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No FAIXA_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Access gate - request throttle plus API key check (see [`AccessPolicy`])
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let policy = access::AccessPolicy::from_env();
    if policy.throttled() {
        tracing::info!("Rate limiting enabled (FAIXA_RATE_LIMIT)");
    } else {
        tracing::info!("Rate limiting disabled");
    }
    if policy.requires_key() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "⚠️  API key authentication DISABLED - all endpoints are publicly accessible! \
             Set FAIXA_API_KEY environment variable to enable authentication."
        );
    }

    // Build base router with routes
    let router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/students",
            get(handlers::list_students_handler).post(handlers::register_handler),
        )
        .route("/students/{id}", get(handlers::student_handler))
        .route(
            "/students/{id}/eligibility",
            get(handlers::eligibility_handler),
        )
        .route(
            "/students/{id}/attendance",
            post(handlers::attendance_handler),
        )
        .route(
            "/students/{id}/promotions",
            get(handlers::history_handler).post(handlers::promote_handler),
        )
        .route("/students/{id}/degree", post(handlers::degree_handler));

    // Apply the access gate, then CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum_middleware::from_fn_with_state(policy, access::gate))
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, session: Session) -> Result<(), FaixaError> {
    let state = AppState::new(session);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FaixaError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Faixa HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| FaixaError::IoError(format!("Server error: {}", e)))
}
