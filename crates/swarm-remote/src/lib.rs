//! Client for the optional external shape generator: free text in, a sparse
//! point cloud out. Failures are per-request and never touch morph state.

pub mod client;
pub mod error;

pub use client::{DEFAULT_ENDPOINT, DEFAULT_MODEL, ShapeClient, api_key_from_env, parse_response, request_body};
pub use error::{RemoteError, Result};
