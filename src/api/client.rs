//! Purpose: Blocking HTTP client for the identity-resolution endpoint.
//! Exports: `IdentityClient`, `IdentityEndpoint`, `ApiResult`.
//! Role: Owns the wire exchange and classifies every outcome into `Value` or `Error`.
//! Invariants: One POST per call; no retry, no client-imposed timeout, no cancellation.
//! Invariants: Response objects keep their wire key order (serde_json `preserve_order`).
//! Invariants: Error messages shown to users are either the server's `error` string or a fixed fallback.
#![allow(clippy::result_large_err)]

use super::FormInput;
use crate::core::error::{Error, ErrorKind, HTTP_FALLBACK_MESSAGE, TRANSPORT_FALLBACK_MESSAGE};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

pub type ApiResult<T> = Result<T, Error>;

/// Anything that can resolve a `FormInput` into the service's JSON answer.
pub trait IdentityEndpoint {
    fn identify(&self, input: &FormInput) -> ApiResult<Value>;
}

#[derive(Clone)]
pub struct IdentityClient {
    endpoint: Url,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<Value>,
}

impl IdentityClient {
    pub fn new(endpoint: impl AsRef<str>) -> ApiResult<Self> {
        let endpoint = normalize_endpoint(endpoint.as_ref())?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self { endpoint, agent })
    }

    pub fn with_agent(mut self, agent: ureq::Agent) -> Self {
        self.agent = agent;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl IdentityEndpoint for IdentityClient {
    fn identify(&self, input: &FormInput) -> ApiResult<Value> {
        let payload = serde_json::to_string(&input.to_request()).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode request json")
                .with_source(err)
        })?;
        tracing::debug!(endpoint = %self.endpoint, "posting identify request");

        let response = self
            .agent
            .post(self.endpoint.as_str())
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .send_string(&payload);

        match response {
            // Unfollowed 3xx replies (e.g. a 307 without `Location`) also land here.
            Ok(resp) if !is_success(resp.status()) => {
                let status = resp.status();
                let body = resp.into_string().unwrap_or_default();
                Err(decode_failure(status, &body))
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string().map_err(|err| {
                    Error::new(ErrorKind::Transport)
                        .with_message(TRANSPORT_FALLBACK_MESSAGE)
                        .with_status(status)
                        .with_source(err)
                })?;
                decode_success(&body).map_err(|err| err.with_status(status))
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(decode_failure(code, &body))
            }
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Transport)
                .with_message(TRANSPORT_FALLBACK_MESSAGE)
                .with_source(err)),
        }
    }
}

fn normalize_endpoint(raw: &str) -> ApiResult<Url> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid identify endpoint url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("identify endpoint must use http or https scheme")
            .with_hint("Pass --endpoint https://host/identify"));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// A success body that is not JSON leaves nothing to render, so it is a transport-class failure.
fn decode_success(body: &str) -> ApiResult<Value> {
    serde_json::from_str(body).map_err(|err| {
        Error::new(ErrorKind::Transport)
            .with_message(TRANSPORT_FALLBACK_MESSAGE)
            .with_source(err)
    })
}

fn decode_failure(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| match parsed.error {
            Some(Value::String(text)) if !text.is_empty() => Some(text),
            _ => None,
        })
        .unwrap_or_else(|| HTTP_FALLBACK_MESSAGE.to_string());
    Error::new(ErrorKind::Http)
        .with_message(message)
        .with_status(status)
}
