//! The public JSON client.
//!
//! # Design
//! Every operation comes as a pair: an async method, and a `_blocking`
//! method that drives the async one through [`block_on`]. Raw `*_response`
//! calls hand back the transport's response untouched. Typed calls wrap the
//! raw call, apply the success-only check and then decode the body.
//!
//! Requests always carry `Accept: application/json` plus every active entry
//! of the client's [`HeaderStore`]. The store is a shared handle, so headers
//! set through one client apply to every client built with the same store.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::blocking::block_on;
use crate::codec::{deserialize_body, Payload};
use crate::error::{ApiError, Result};
use crate::headers::HeaderStore;
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, ACCEPT, APPLICATION_JSON, CONTENT_TYPE, FORM_URLENCODED,
};
use crate::query::{form_urlencode, to_query_string};
use crate::transport::{ReqwestTransport, Transport};

/// HTTP+JSON client with async and blocking entry points.
///
/// A client built without an explicit transport owns a fresh
/// [`ReqwestTransport`]. A transport passed in as an `Arc` is shared and
/// stays usable after the client is dropped.
pub struct JsonService {
    transport: Arc<dyn Transport>,
    headers: HeaderStore,
    success_only: AtomicBool,
}

impl fmt::Debug for JsonService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonService")
            .field("headers", &self.headers)
            .field("success_only", &self.is_success_only())
            .finish_non_exhaustive()
    }
}

impl JsonService {
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            headers: HeaderStore::new(),
            success_only: AtomicBool::new(false),
        }
    }

    pub fn builder() -> JsonServiceBuilder {
        JsonServiceBuilder::default()
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    /// Make typed calls fail on non-2xx responses before decoding the body.
    pub fn enable_success_only_mode(&self, success_only: bool) {
        self.success_only.store(success_only, Ordering::SeqCst);
    }

    pub fn is_success_only(&self) -> bool {
        self.success_only.load(Ordering::SeqCst)
    }

    /// The store consulted by every request this client builds.
    pub fn headers(&self) -> &HeaderStore {
        &self.headers
    }

    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set_header(name, value);
    }

    pub fn clear_header(&self, name: impl Into<String>) {
        self.headers.clear_header(name);
    }

    pub fn clear_headers(&self) {
        self.headers.clear_headers();
    }

    // ---------------------------------------------------------------------
    // OAuth
    // ---------------------------------------------------------------------

    /// POST `form` as `application/x-www-form-urlencoded` and decode the reply.
    /// Never status-checked, even in success-only mode.
    pub async fn oauth<T, K, V>(&self, uri: &str, form: &[(K, V)]) -> Result<T>
    where
        T: DeserializeOwned + Default,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = self.build_request(HttpMethod::Post, uri.to_string());
        attach_body(&mut request, form_urlencode(form), FORM_URLENCODED);
        let response = self.send(request).await?;
        deserialize_body(&response.body)
    }

    pub fn oauth_blocking<T, K, V>(&self, uri: &str, form: &[(K, V)]) -> Result<T>
    where
        T: DeserializeOwned + Default + Send,
        K: AsRef<str> + Sync,
        V: AsRef<str> + Sync,
    {
        block_on(self.oauth(uri, form))
    }

    // ---------------------------------------------------------------------
    // GET
    // ---------------------------------------------------------------------

    pub async fn get<T, Q>(&self, uri: &str, data: Option<&Q>) -> Result<(HttpResponse, T)>
    where
        T: DeserializeOwned + Default,
        Q: Serialize + ?Sized,
    {
        let response = self.get_response(uri, data).await?;
        let value = self.decode(&response)?;
        Ok((response, value))
    }

    pub fn get_blocking<T, Q>(&self, uri: &str, data: Option<&Q>) -> Result<(HttpResponse, T)>
    where
        T: DeserializeOwned + Default + Send,
        Q: Serialize + Sync + ?Sized,
    {
        block_on(self.get(uri, data))
    }

    /// GET `uri` with `data` appended as a query string.
    pub async fn get_response<Q>(&self, uri: &str, data: Option<&Q>) -> Result<HttpResponse>
    where
        Q: Serialize + ?Sized,
    {
        let url = format!("{uri}{}", to_query_string(data, true)?);
        let request = self.build_request(HttpMethod::Get, url);
        self.send(request).await
    }

    pub fn get_response_blocking<Q>(&self, uri: &str, data: Option<&Q>) -> Result<HttpResponse>
    where
        Q: Serialize + Sync + ?Sized,
    {
        block_on(self.get_response(uri, data))
    }

    // ---------------------------------------------------------------------
    // POST
    // ---------------------------------------------------------------------

    pub async fn post<T>(&self, uri: &str, payload: Payload) -> Result<(HttpResponse, T)>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.post_response(uri, payload).await?;
        let value = self.decode(&response)?;
        Ok((response, value))
    }

    pub fn post_blocking<T>(&self, uri: &str, payload: Payload) -> Result<(HttpResponse, T)>
    where
        T: DeserializeOwned + Default + Send,
    {
        block_on(self.post(uri, payload))
    }

    pub async fn post_response(&self, uri: &str, payload: Payload) -> Result<HttpResponse> {
        self.send_payload(HttpMethod::Post, uri, payload).await
    }

    pub fn post_response_blocking(&self, uri: &str, payload: Payload) -> Result<HttpResponse> {
        block_on(self.post_response(uri, payload))
    }

    // ---------------------------------------------------------------------
    // PUT
    // ---------------------------------------------------------------------

    pub async fn put<T>(&self, uri: &str, payload: Payload) -> Result<(HttpResponse, T)>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.put_response(uri, payload).await?;
        let value = self.decode(&response)?;
        Ok((response, value))
    }

    pub fn put_blocking<T>(&self, uri: &str, payload: Payload) -> Result<(HttpResponse, T)>
    where
        T: DeserializeOwned + Default + Send,
    {
        block_on(self.put(uri, payload))
    }

    pub async fn put_response(&self, uri: &str, payload: Payload) -> Result<HttpResponse> {
        self.send_payload(HttpMethod::Put, uri, payload).await
    }

    pub fn put_response_blocking(&self, uri: &str, payload: Payload) -> Result<HttpResponse> {
        block_on(self.put_response(uri, payload))
    }

    // ---------------------------------------------------------------------
    // PATCH
    // ---------------------------------------------------------------------

    pub async fn patch<T>(&self, uri: &str, payload: Payload) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.patch_response(uri, payload).await?;
        self.decode(&response)
    }

    pub fn patch_blocking<T>(&self, uri: &str, payload: Payload) -> Result<T>
    where
        T: DeserializeOwned + Default + Send,
    {
        block_on(self.patch(uri, payload))
    }

    pub async fn patch_response(&self, uri: &str, payload: Payload) -> Result<HttpResponse> {
        self.send_payload(HttpMethod::Patch, uri, payload).await
    }

    pub fn patch_response_blocking(&self, uri: &str, payload: Payload) -> Result<HttpResponse> {
        block_on(self.patch_response(uri, payload))
    }

    // ---------------------------------------------------------------------
    // DELETE
    // ---------------------------------------------------------------------

    pub async fn delete<T>(&self, uri: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.delete_response(uri).await?;
        self.decode(&response)
    }

    pub fn delete_blocking<T>(&self, uri: &str) -> Result<T>
    where
        T: DeserializeOwned + Default + Send,
    {
        block_on(self.delete(uri))
    }

    /// DELETE always carries an empty JSON body.
    pub async fn delete_response(&self, uri: &str) -> Result<HttpResponse> {
        self.send_payload(HttpMethod::Delete, uri, Payload::Empty).await
    }

    pub fn delete_response_blocking(&self, uri: &str) -> Result<HttpResponse> {
        block_on(self.delete_response(uri))
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn build_request(&self, method: HttpMethod, url: String) -> HttpRequest {
        let mut headers = vec![(ACCEPT.to_string(), APPLICATION_JSON.to_string())];
        headers.extend(self.headers.active());
        HttpRequest {
            method,
            url,
            headers,
            body: None,
        }
    }

    async fn send_payload(&self, method: HttpMethod, uri: &str, payload: Payload) -> Result<HttpResponse> {
        let mut request = self.build_request(method, uri.to_string());
        let (body, content_type) = payload.into_body()?;
        attach_body(&mut request, body, content_type);
        self.send(request).await
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(
            method = %request.method,
            url = %request.url,
            headers = request.headers.len(),
            "sending request"
        );
        let response = self.transport.send(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    fn ensure_success(&self, response: &HttpResponse) -> Result<()> {
        if !self.is_success_only() || response.is_success() {
            return Ok(());
        }
        warn!(status = response.status, "success-only mode rejected response");
        Err(ApiError::Status {
            status: response.status,
            reason: response.reason().to_string(),
        })
    }

    fn decode<T>(&self, response: &HttpResponse) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        self.ensure_success(response)?;
        deserialize_body(&response.body)
    }
}

fn attach_body(request: &mut HttpRequest, body: String, content_type: &str) {
    request
        .headers
        .push((CONTENT_TYPE.to_string(), content_type.to_string()));
    request.body = Some(body);
}

/// Builder for [`JsonService`].
///
/// `timeout` and `user_agent` configure the default reqwest transport and
/// are ignored when a transport is supplied.
#[derive(Default)]
pub struct JsonServiceBuilder {
    transport: Option<Arc<dyn Transport>>,
    headers: Option<HeaderStore>,
    success_only: bool,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl fmt::Debug for JsonServiceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonServiceBuilder")
            .field("has_transport", &self.transport.is_some())
            .field("headers", &self.headers)
            .field("success_only", &self.success_only)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl JsonServiceBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share `headers` with this client.
    pub fn headers(mut self, headers: HeaderStore) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn success_only(mut self, success_only: bool) -> Self {
        self.success_only = success_only;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<JsonService> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = ReqwestTransport::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(agent) = self.user_agent {
                    builder = builder.user_agent(agent);
                }
                Arc::new(builder.build()?)
            }
        };
        Ok(JsonService {
            transport,
            headers: self.headers.unwrap_or_default(),
            success_only: AtomicBool::new(self.success_only),
        })
    }
}
