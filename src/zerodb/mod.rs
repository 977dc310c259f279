//! Clients for the hosted ZeroDB public API.
//!
//! Everything here is a thin HTTP wrapper: embeddings, indexing, and ranking
//! all happen on the remote service. The chat pipeline talks to these modules
//! through the `TokenProvider` and `VectorSearch` traits.

pub mod auth;
pub mod feedback;
pub mod ingest;
pub mod search;

pub use auth::{AuthToken, TokenProvider, ZeroDbAuthClient};
pub use feedback::{FeedbackClient, FeedbackRecord};
pub use ingest::{IngestClient, IngestDocument, SeedRecord};
pub use search::{SearchResult, VectorSearch, ZeroDbSearchClient};
