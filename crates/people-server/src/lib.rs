//! HTTP front for the people graph: GraphQL over POST, GraphiQL and a health check.

mod error;
mod server;

pub use error::Error;
pub use server::{router, serve, ServeConfig};

pub type Result<T> = std::result::Result<T, Error>;
