use std::sync::Arc;

use async_graphql::dynamic::Schema;

#[derive(Clone)]
pub(crate) struct ServerState {
    pub schema: Schema,
    /// Endpoint the GraphiQL page sends its requests to.
    pub graph_path: Arc<str>,
}
