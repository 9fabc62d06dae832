//! HTTP/REST API for storefront chat widgets.
//!
//! Axum-based REST API at `/api/v1/` with envelope responses and CORS.
//! Each path session id addresses one chat instance.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
