use std::sync::Arc;

use crate::base::{CrawlerError, Data, ErrorKind, Response};

/// A response parser supplied to an [`Analyzer`] (§4.6 `Analyzer`).
///
/// Parsers run in the order they were registered on the scheduler; a parser
/// slot of `None` stands for a parser that failed to load and contributes one
/// [`CrawlerError`] without halting the remaining slots. The returned data
/// list and error list are independent: a parser may produce both data and
/// errors from the same response, or neither.
pub type ParseResponse = dyn Fn(&Response) -> (Vec<Data>, Vec<String>) + Send + Sync;

/// Runs a response through every registered parser (§4.6).
///
/// One `Analyzer` is built per slot of the analyzer [`crate::pool::Pool`].
#[derive(Clone)]
pub struct Analyzer {
    id: u32,
}

impl Analyzer {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self { id }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Runs `resp` through every entry of `parsers` in order, collecting
    /// produced data and errors; a single failing or missing parser never
    /// aborts the remaining ones.
    ///
    /// Every [`crate::base::Request`] a parser produces is re-stamped to
    /// `resp.depth() + 1` via [`crate::base::Request::at_depth`], discarding
    /// whatever depth the parser itself assigned.
    #[must_use]
    pub fn analyze(&self, parsers: &[Option<Arc<ParseResponse>>], resp: &Response) -> (Vec<Data>, Vec<CrawlerError>) {
        let mut data = Vec::new();
        let mut errors = Vec::new();
        let next_depth = resp.depth() + 1;

        for parser in parsers {
            let Some(parser) = parser else {
                errors.push(CrawlerError::new(ErrorKind::Analyzer, "nil parser function supplied"));
                continue;
            };

            let (produced, parser_errors) = parser(resp);
            for item in produced {
                data.push(match item {
                    Data::Request(req) => Data::Request(req.at_depth(next_depth)),
                    Data::Item(item) => Data::Item(item),
                });
            }
            for message in parser_errors {
                errors.push(CrawlerError::new(ErrorKind::Analyzer, message));
            }
        }

        (data, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Item, Request};
    use reqwest::{StatusCode, Url};

    fn resp(depth: u32) -> Response {
        Response::new(
            Url::parse("http://example.com").unwrap(),
            StatusCode::OK,
            reqwest::header::HeaderMap::new(),
            Vec::new(),
            depth,
        )
    }

    #[test]
    fn produced_requests_are_restamped_to_response_depth_plus_one() {
        let analyzer = Analyzer::new(0);
        let parser: Arc<ParseResponse> = Arc::new(|_resp: &Response| {
            (
                vec![Data::Request(Request::new(Url::parse("http://example.com/child").unwrap(), 99))],
                vec![],
            )
        });

        let (data, errors) = analyzer.analyze(&[Some(parser)], &resp(2));
        assert!(errors.is_empty());
        assert_eq!(data.len(), 1);
        match &data[0] {
            Data::Request(req) => assert_eq!(req.depth(), 3),
            Data::Item(_) => panic!("expected a request"),
        }
    }

    #[test]
    fn missing_parser_contributes_one_error_without_aborting() {
        let analyzer = Analyzer::new(0);
        let ok_parser: Arc<ParseResponse> = Arc::new(|_resp: &Response| (vec![Data::Item(Item::new())], vec![]));

        let (data, errors) = analyzer.analyze(&[None, Some(ok_parser)], &resp(0));
        assert_eq!(errors.len(), 1);
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn a_failing_parser_does_not_prevent_others_from_running() {
        let analyzer = Analyzer::new(0);
        let failing: Arc<ParseResponse> = Arc::new(|_resp: &Response| (vec![], vec!["boom".to_string()]));
        let ok_parser: Arc<ParseResponse> = Arc::new(|_resp: &Response| (vec![Data::Item(Item::new())], vec![]));

        let (data, errors) = analyzer.analyze(&[Some(failing), Some(ok_parser)], &resp(0));
        assert_eq!(errors.len(), 1);
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn a_parser_may_return_data_and_errors_from_the_same_response() {
        let analyzer = Analyzer::new(0);
        let mixed: Arc<ParseResponse> =
            Arc::new(|_resp: &Response| (vec![Data::Item(Item::new())], vec!["partial failure".to_string()]));

        let (data, errors) = analyzer.analyze(&[Some(mixed)], &resp(0));
        assert_eq!(data.len(), 1);
        assert_eq!(errors.len(), 1);
    }
}
