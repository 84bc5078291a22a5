//! HTTP API layer for ladle.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: recipes, ingredients, users, subscriptions, auth tokens
//! - **Extractors**: required and optional token authentication
//! - **Middleware**: token resolution, shared application state
//! - **Pagination**: page-number and limit/offset envelopes
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod pagination;

pub use endpoints::{not_found, router, short_link_redirect};
pub use middleware::{AppState, auth_middleware};
pub use pagination::{DEFAULT_PAGE_SIZE, Paginated};
