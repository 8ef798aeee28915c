//! HTTP client for the lost-and-found backend.
//!
//! Builds headers and bodies, enforces the per-request timeout and maps
//! every outcome onto [`ApiError`].

mod body;
mod client;
mod error;

pub use body::{build_headers, encode_body, EncodedBody, FormData, FormField, RequestBody};
pub use client::{decode, handle_response, path_with_query, ApiClient, RequestOptions};
pub use error::ApiError;
