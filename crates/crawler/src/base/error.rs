use std::fmt;

/// The kind of stage a [`CrawlerError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Downloader,
    Analyzer,
    ItemProcessor,
    Scheduler,
}

impl ErrorKind {
    fn label(self) -> &'static str {
        match self {
            ErrorKind::Downloader => "Dowload Error",
            ErrorKind::Analyzer => "Analyzer Error",
            ErrorKind::ItemProcessor => "Item Processor Error",
            ErrorKind::Scheduler => "",
        }
    }
}

/// A tagged error value carrying an [`ErrorKind`] and a message.
///
/// `Display` renders the stable `Crauler Error:<Kind>:<message>` prefix (the
/// misspelling is preserved deliberately, see `SPEC_FULL.md` §9 — external
/// tools may grep for it).
#[derive(Debug, Clone)]
pub struct CrawlerError {
    kind: ErrorKind,
    message: String,
}

impl CrawlerError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CrawlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crauler Error:")?;
        let label = self.kind.label();
        if !label.is_empty() {
            write!(f, "{label}:")?;
        }
        writeln!(f, "{}", self.message)
    }
}

impl std::error::Error for CrawlerError {}
