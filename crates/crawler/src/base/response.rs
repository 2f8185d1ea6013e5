use reqwest::{StatusCode, Url};

/// An HTTP response paired with the depth inherited from its originating
/// request.
#[derive(Debug, Clone)]
pub struct Response {
    url: Url,
    status: StatusCode,
    headers: reqwest::header::HeaderMap,
    body: Vec<u8>,
    depth: u32,
}

impl Response {
    #[must_use]
    pub fn new(
        url: Url,
        status: StatusCode,
        headers: reqwest::header::HeaderMap,
        body: Vec<u8>,
        depth: u32,
    ) -> Self {
        Self {
            url,
            status,
            headers,
            body,
            depth,
        }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &reqwest::header::HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}
