use std::sync::Arc;

use reqwest::{Method, Url};

/// An HTTP request descriptor paired with the depth it was discovered at.
///
/// Immutable after construction. The seed request carries depth `0`; every
/// request produced by an analyzer carries `response_depth + 1`, regardless
/// of whatever depth the parser that produced it assigned (see
/// [`crate::analyzer::Analyzer::analyze`]).
#[derive(Debug, Clone)]
pub struct Request {
    url: Url,
    method: Method,
    headers: Arc<reqwest::header::HeaderMap>,
    body: Option<Arc<Vec<u8>>>,
    depth: u32,
}

impl Request {
    #[must_use]
    pub fn new(url: Url, depth: u32) -> Self {
        Self::with_body(url, Method::GET, reqwest::header::HeaderMap::new(), None, depth)
    }

    #[must_use]
    pub fn with_body(
        url: Url,
        method: Method,
        headers: reqwest::header::HeaderMap,
        body: Option<Vec<u8>>,
        depth: u32,
    ) -> Self {
        Self {
            url,
            method,
            headers: Arc::new(headers),
            body: body.map(Arc::new),
            depth,
        }
    }

    /// Returns a copy of this request with `depth` overwritten.
    ///
    /// Used by the analyzer to re-stamp a parser-produced request's depth to
    /// `response_depth + 1`, discarding whatever depth the parser assigned.
    #[must_use]
    pub fn at_depth(&self, depth: u32) -> Self {
        Self {
            depth,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn headers(&self) -> &reqwest::header::HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref().map(Vec::as_slice)
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Mirrors the reference implementation's `Valid()`: a request is valid
    /// iff its body slot was set, even to an empty body. A GET request built
    /// via [`Self::new`] carries `body: None` and is therefore invalid by
    /// this check, the same as the reference's `httpReq.Body == nil` case.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.body.is_some()
    }
}
