// Trace service HTTP client
//
// Wraps `reqwest::Client` with base-URL normalization and response
// decoding for the two trace endpoints. Callers never see raw bodies
// except inside `Error::Deserialization`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{SubmitResponse, TraceProgress, TraceRequest};
use crate::transport::TransportConfig;

/// Async client for the external trace service.
///
/// The base URL points at the service root, e.g.
/// `http://localhost:8181/api/amlight/sdntrace`; endpoint paths are
/// joined onto it.
#[derive(Debug, Clone)]
pub struct TraceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TraceClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The normalized service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Submit a trace and return its identifier.
    pub async fn submit(&self, request: &TraceRequest) -> Result<String, Error> {
        let resp: SubmitResponse = self.put(&["trace"], request).await?;
        debug!(trace_id = %resp.result.trace_id, "trace submitted");
        Ok(resp.result.trace_id)
    }

    /// Fetch the current progress of a submitted trace.
    pub async fn progress(&self, trace_id: &str) -> Result<TraceProgress, Error> {
        self.get(&["trace", trace_id]).await
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body.chars().take(200).collect()
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = TraceClient::with_client(
            reqwest::Client::new(),
            "http://localhost:8181/api/amlight/sdntrace",
        )
        .unwrap();
        assert_eq!(
            client.url(&["trace"]).unwrap().as_str(),
            "http://localhost:8181/api/amlight/sdntrace/trace"
        );
    }

    #[test]
    fn base_url_keeps_single_slash() {
        let client =
            TraceClient::with_client(reqwest::Client::new(), "http://localhost:8181/sdntrace/")
                .unwrap();
        assert_eq!(
            client.url(&["trace", "42"]).unwrap().as_str(),
            "http://localhost:8181/sdntrace/trace/42"
        );
    }

    #[test]
    fn trace_id_is_a_single_escaped_segment() {
        let client = TraceClient::with_client(
            reqwest::Client::new(),
            "http://localhost:8181/api/amlight/sdntrace",
        )
        .unwrap();
        assert_eq!(
            client.url(&["trace", "../x?y=1"]).unwrap().as_str(),
            "http://localhost:8181/api/amlight/sdntrace/trace/..%2Fx%3Fy=1"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = TraceClient::with_client(reqwest::Client::new(), "not a url");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
