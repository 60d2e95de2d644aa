/// The people server error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Routes must be absolute
    #[error("the {0} path `{1}` must start with `/`")]
    InvalidPath(&'static str, String),
    /// The configured routes cannot coexist
    #[error("the health check path `{0}` collides with the GraphQL endpoint")]
    RouteConflict(String),
    /// Cannot bind the listener
    #[error("binding {address}: {source}")]
    Bind {
        address: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// Cannot start the HTTP server
    #[error("starting server: {0}")]
    Server(#[source] std::io::Error),
    #[cfg(feature = "lambda")]
    #[error("lambda runtime: {0}")]
    Lambda(String),
}
