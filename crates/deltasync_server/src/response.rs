//! Wire rendering of negotiation outcomes.

use crate::error::ServerResult;
use crate::negotiate::Negotiated;
use axum::body::Body;
use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use deltasync_protocol::headers::{self, quote, IM_JSON_PATCH, MIME_JSON, MIME_JSON_PATCH};
use deltasync_protocol::{Patch, ProtocolFlavor, Snapshot};

/// A fully rendered response, independent of the HTTP server.
#[derive(Debug, Clone)]
pub struct DeltaResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Vec<u8>,
}

impl DeltaResponse {
    fn new(status: StatusCode, current: &Snapshot) -> ServerResult<Self> {
        let mut response = Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        };
        response.insert(headers::ETAG, &quote(&current.tag()))?;
        Ok(response)
    }

    fn insert(&mut self, name: &'static str, value: &str) -> ServerResult<()> {
        self.headers
            .insert(HeaderName::from_static(name), HeaderValue::from_str(value)?);
        Ok(())
    }

    fn with_json(mut self, content_type: &'static str, body: Vec<u8>) -> ServerResult<Self> {
        self.insert(headers::CONTENT_TYPE, content_type)?;
        self.body = body;
        Ok(self)
    }

    /// Returns a header value as a string, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl Negotiated {
    /// Renders this outcome for the given flavor.
    ///
    /// | outcome   | delta                                   | since                     |
    /// |-----------|-----------------------------------------|---------------------------|
    /// | full      | 200, `application/json`                 | same                      |
    /// | unchanged | 304, empty body                         | 200, empty patch `[]`     |
    /// | patch     | 226, `IM: jsonpatch`, `Delta-Base`      | 200, patch media type     |
    ///
    /// Every response carries the quoted current `ETag`. Fails only if the
    /// body cannot be encoded; no partial response is produced.
    pub fn render(&self, flavor: ProtocolFlavor) -> ServerResult<DeltaResponse> {
        match (self, flavor) {
            (Negotiated::Full { current }, _) => DeltaResponse::new(StatusCode::OK, current)?
                .with_json(MIME_JSON, serde_json::to_vec(&current.document)?),

            (Negotiated::Unchanged { current }, ProtocolFlavor::Delta) => {
                DeltaResponse::new(StatusCode::NOT_MODIFIED, current)
            }
            (Negotiated::Unchanged { current }, ProtocolFlavor::ModifiedSince) => {
                DeltaResponse::new(StatusCode::OK, current)?
                    .with_json(MIME_JSON_PATCH, Patch::new().to_json()?)
            }

            (Negotiated::Patch { current, base, patch }, ProtocolFlavor::Delta) => {
                let mut response = DeltaResponse::new(StatusCode::IM_USED, current)?
                    .with_json(MIME_JSON_PATCH, patch.to_json()?)?;
                response.insert(headers::IM, IM_JSON_PATCH)?;
                response.insert(headers::DELTA_BASE, &quote(&base.tag()))?;
                Ok(response)
            }
            (Negotiated::Patch { current, patch, .. }, ProtocolFlavor::ModifiedSince) => {
                DeltaResponse::new(StatusCode::OK, current)?
                    .with_json(MIME_JSON_PATCH, patch.to_json()?)
            }
        }
    }
}

impl IntoResponse for DeltaResponse {
    fn into_response(self) -> Response {
        // Built by hand so an empty body gets no default content type.
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
