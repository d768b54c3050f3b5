//! Synchronous client core for the Carrot API.
//!
//! # Overview
//! Validates whether a remote user has authorized an application and posts
//! signed achievement, score, action and like events on the user's behalf.
//!
//! # Design
//! - `CarrotClient` holds only an immutable `ClientConfig` and a `Transport`.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (classifies an `HttpResponse`), so the I/O boundary is
//!   explicit and the FFI crate can hand the round-trip to its host.
//! - Signed requests follow the Carrot scheme in `signing`: sorted params,
//!   HMAC-SHA256 over `METHOD\nHOST\nPATH\nPARAMS`, base64 `sig`.
//! - Expected outcomes are `AuthorizationStatus` values; only transport and
//!   encoding failures are `ApiError`s.
//! - The default `ureq` feature provides `UreqTransport`. Without it the crate
//!   does no I/O and callers pair `build_*`/`parse_*` with their own HTTP stack.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod signing;
pub mod status;
pub mod transport;
pub mod types;

pub use client::CarrotClient;
pub use config::{ClientConfig, DEFAULT_HOSTNAME};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Scheme};
pub use signing::{RequestParameters, RequestStamp, SignedEnvelope};
pub use status::{AuthorizationStatus, SignedResponse};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Action, Properties};
