//! HTTP transport
//!
//! `POST /query` executes GraphQL documents with the caller's credentials
//! taken from the request headers. `GET /` serves GraphiQL when the
//! playground is enabled, and `GET /healthz` answers liveness probes.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};

use crate::graph::CrossgraphSchema;
use crate::kube::Credentials;

const IMPERSONATE_USER: &str = "impersonate-user";
const IMPERSONATE_GROUP: &str = "impersonate-group";

/// Server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub listen: SocketAddr,
    pub playground: bool,
}

#[derive(Clone)]
struct AppState {
    schema: CrossgraphSchema,
}

/// Build the router for `schema`.
pub fn router(schema: CrossgraphSchema, playground: bool) -> Router {
    let mut router = Router::new()
        .route("/query", post(query))
        .route("/healthz", get(healthz));
    if playground {
        router = router.route("/", get(graphiql));
    }
    router.with_state(AppState { schema })
}

/// Serve until interrupted.
pub async fn serve(schema: CrossgraphSchema, options: ServerOptions) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(options.listen)
        .await
        .with_context(|| format!("Failed to listen on {}", options.listen))?;
    tracing::info!("Serving GraphQL on http://{}/query", options.listen);
    if options.playground {
        tracing::info!("GraphiQL available at http://{}/", options.listen);
    }

    axum::serve(listener, router(schema, options.playground))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn query(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let credentials = credentials_from(&headers);
    if credentials.is_anonymous() {
        tracing::debug!("Executing request without credentials");
    }
    let request = request.into_inner().data(credentials);
    state.schema.execute(request).await.into()
}

async fn healthz() -> &'static str {
    "ok"
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/query").finish())
}

/// Read the caller's bearer token and impersonation headers.
pub fn credentials_from(headers: &HeaderMap) -> Credentials {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim().to_string())
        })
        .filter(|t| !t.is_empty());

    let impersonate_user = headers
        .get(IMPERSONATE_USER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|u| !u.is_empty());

    let impersonate_groups = headers
        .get_all(IMPERSONATE_GROUP)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();

    Credentials {
        token,
        impersonate_user,
        impersonate_groups,
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
    tracing::info!("Shutting down");
}
