mod health;
mod state;

use std::net::SocketAddr;

use async_graphql::{dynamic::Schema, http::GraphiQLSource};
use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use people_config::Config;
use tokio::signal;

use self::state::ServerState;
use crate::Error;

/// Start parameters for the server.
pub struct ServeConfig {
    pub listen_address: SocketAddr,
    pub config: Config,
}

/// Serves `schema` until a termination signal arrives.
///
/// With the `lambda` feature the router is handed to the Lambda runtime instead and
/// `listen_address` is ignored.
pub async fn serve(ServeConfig { listen_address, config }: ServeConfig, schema: Schema) -> crate::Result<()> {
    let path = config.graph.path().to_string();
    let router = router(schema, &config)?;

    cfg_if::cfg_if! {
        if #[cfg(feature = "lambda")] {
            let _ = listen_address;
            lambda_bind(&path, router).await
        } else {
            bind(listen_address, &path, router).await
        }
    }
}

/// Routes for the GraphQL endpoint, the optional GraphiQL page and the optional health check.
pub fn router(schema: Schema, config: &Config) -> crate::Result<Router> {
    let path = config.graph.path();
    check_path("GraphQL", path)?;

    let state = ServerState {
        schema,
        graph_path: path.into(),
    };

    let mut graph = post(execute);

    if config.graph.graphiql {
        graph = graph.get(graphiql);
    }

    let mut router = Router::new().route(path, graph);

    if config.health.enabled {
        check_path("health check", &config.health.path)?;

        if config.health.path == path {
            return Err(Error::RouteConflict(config.health.path.clone()));
        }

        router = router.route(&config.health.path, get(health::health));
    }

    Ok(router.with_state(state))
}

/// axum panics on routes that are not absolute.
fn check_path(route: &'static str, path: &str) -> crate::Result<()> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(Error::InvalidPath(route, path.to_string()))
    }
}

#[cfg_attr(feature = "lambda", allow(unused))]
async fn bind(address: SocketAddr, path: &str, router: Router) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|source| Error::Bind { address, source })?;

    let local_address = listener.local_addr().map_err(|source| Error::Bind { address, source })?;
    tracing::info!("GraphQL endpoint exposed at http://{local_address}{path}");

    axum::serve(listener, router)
        .with_graceful_shutdown(graceful_shutdown())
        .await
        .map_err(Error::Server)
}

#[cfg(feature = "lambda")]
async fn lambda_bind(path: &str, router: Router) -> crate::Result<()> {
    let app = tower::ServiceBuilder::new()
        .layer(axum_aws_lambda::LambdaLayer::default())
        .service(router);

    tracing::info!("GraphQL endpoint exposed at {path}");

    lambda_http::run(app).await.map_err(|err| Error::Lambda(err.to_string()))
}

async fn execute(
    State(state): State<ServerState>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let response = state.schema.execute(request).await;

    if response.is_err() {
        tracing::debug!(errors = response.errors.len(), "request finished with errors");
    }

    Json(response)
}

async fn graphiql(State(state): State<ServerState>) -> Html<String> {
    Html(GraphiQLSource::build().endpoint(&state.graph_path).finish())
}

/// Resolves on Ctrl+C or SIGTERM, letting in-flight requests complete.
async fn graceful_shutdown() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down gracefully...");
}
