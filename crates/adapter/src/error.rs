// ABOUTME: Error types for the adapter including the ErrorCode enum and AdapterError struct.
// ABOUTME: Separates transport failures from markup mismatches so hosts can tell them apart.

use std::fmt;

/// Error codes representing different categories of adapter failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    InvalidQuery,
    Fetch,
    Timeout,
    Structure,
    Cancelled,
    Config,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::InvalidQuery => "invalid query",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Structure => "page structure mismatch",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::Config => "configuration error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for adapter operations.
#[derive(Debug, thiserror::Error)]
pub struct AdapterError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gte: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl AdapterError {
    fn with_code(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create an InvalidQuery error. Queries have no URL yet.
    pub fn invalid_query(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::with_code(ErrorCode::InvalidQuery, String::new(), op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Fetch, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Timeout, url, op, source)
    }

    /// Create a Structure error for pages whose markup no longer matches the rules.
    pub fn structure(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Structure, url, op, source)
    }

    /// Create a Cancelled error.
    pub fn cancelled(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::Cancelled, url, op, None)
    }

    /// Create a Config error.
    pub fn config(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::with_code(ErrorCode::Config, String::new(), op, source)
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is a transport-level failure (fetch or timeout).
    pub fn is_transport(&self) -> bool {
        self.is_fetch() || self.is_timeout()
    }

    /// Returns true if this is a Structure error.
    pub fn is_structure(&self) -> bool {
        self.code == ErrorCode::Structure
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is an InvalidQuery error.
    pub fn is_invalid_query(&self) -> bool {
        self.code == ErrorCode::InvalidQuery
    }

    /// Returns true if this is a Cancelled error.
    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::Cancelled
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }
}
