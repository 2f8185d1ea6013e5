use anyhow::Context;
use reqwest::Client;

use crate::base::{Request, Response};

/// Fetches a single [`Request`] and turns it into a [`Response`] (§4.5
/// `Downloader`).
///
/// One `Downloader` is built per slot of the downloader [`crate::pool::Pool`];
/// each wraps its own `reqwest::Client` (cheaply cloneable, pooling
/// connections internally) so pool slots never contend on a shared client.
#[derive(Debug, Clone)]
pub struct Downloader {
    id: u32,
    client: Client,
}

impl Downloader {
    #[must_use]
    pub fn new(id: u32, client: Client) -> Self {
        Self { id, client }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Issues `req` and awaits the full response body.
    ///
    /// # Errors
    ///
    /// Wraps any transport error raised sending the request or reading the
    /// body in an `anyhow::Error` — the boundary at which a third-party
    /// collaborator error (`reqwest::Error`) crosses into this crate.
    pub async fn download(&self, req: &Request) -> anyhow::Result<Response> {
        let builder = self
            .client
            .request(req.method().clone(), req.url().clone())
            .headers(req.headers().clone());
        let builder = match req.body() {
            Some(body) => builder.body(body.to_vec()),
            None => builder,
        };

        let resp = builder.send().await.context("sending request")?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.context("reading response body")?;

        Ok(Response::new(req.url().clone(), status, headers, body.to_vec(), req.depth()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn download_returns_a_response_at_the_request_depth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let downloader = Downloader::new(0, Client::new());
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let req = Request::new(url, 3);

        let resp = downloader.download(&req).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.body(), b"hello");
        assert_eq!(resp.depth(), 3);
    }

    #[tokio::test]
    async fn download_surfaces_transport_errors() {
        let downloader = Downloader::new(0, Client::new());
        let req = Request::new(Url::parse("http://127.0.0.1:1").unwrap(), 0);
        assert!(downloader.download(&req).await.is_err());
    }
}
