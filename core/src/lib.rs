//! HTTP+JSON client for calling REST endpoints from application and test code.
//!
//! # Overview
//! `JsonService` builds requests, attaches shared headers, serializes
//! payloads as JSON, sends them through a pluggable `Transport`
//! and decodes responses into caller-chosen types. Every operation has an
//! async method and a `_blocking` twin for callers without an executor.
//!
//! # Design
//! - `HttpRequest` / `HttpResponse` are plain data; the network lives
//!   behind `Transport` (`ReqwestTransport` by default).
//! - `HeaderStore` is passed explicitly and shared by cloning the handle.
//! - Query data and payloads are any `Serialize` type; responses are any
//!   `DeserializeOwned + Default` type, so an empty body decodes to the
//!   default value.
//! - The façade adds one check of its own: success-only mode.

pub mod blocking;
pub mod client;
pub mod codec;
pub mod error;
pub mod headers;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;

pub use client::{JsonService, JsonServiceBuilder};
pub use codec::Payload;
pub use error::{ApiError, Result, TransportError};
pub use headers::HeaderStore;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{to_query_string, NO_QUERY};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Thing, TokenResponse};
