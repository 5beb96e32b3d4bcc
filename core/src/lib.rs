//! Typed client core for GitHub repository search.
//!
//! # Overview
//! Endpoints describe requests declaratively; `ApiClient` builds an
//! `HttpRequest`, hands it to a `Transport`, and decodes the response into
//! the endpoint's model. `SearchCoordinator` drives page-by-page search on
//! top of the client and accumulates results for one query.
//!
//! # Design
//! - Models decode through small combinators (`decode`) that fail on the
//!   first bad field with a precise `DecodeError`.
//! - `Endpoint::Response` selects the decoder, so the client never needs to
//!   know about individual endpoints.
//! - Payload errors, non-object bodies and transport failures are distinct
//!   `ApiError` variants. Nothing is retried or cached.
//! - The coordinator allows one outstanding request at a time and is meant
//!   for a single-threaded executor.

pub mod client;
pub mod config;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod search;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use decode::{JsonDecodable, JsonObject};
pub use endpoint::{Endpoint, GetUser, PagedSearch, QueryParams, SearchRepositories};
pub use error::{ApiError, ConfigError, DecodeError, JsonKind, TransportError, TransportErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use search::{PaginationState, RepositorySearch, SearchCoordinator, SearchProgress};
pub use transport::{Transport, UreqTransport};
pub use types::{Repository, SearchResult, User};
