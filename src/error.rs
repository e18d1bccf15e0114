use thiserror::Error;

/// Failure of a single search attempt. Terminal: nothing here is retried.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Failed to fetch results ({status})")]
    HttpStatus { status: u16 },

    #[error("Failed to fetch results: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Unexpected response from the search API: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for SearchError {
    // The request URL carries the API key; keep it out of messages shown to users.
    fn from(err: reqwest::Error) -> Self {
        SearchError::Network(err.without_url())
    }
}

impl SearchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::HttpStatus { status } => Some(*status),
            SearchError::Network(err) => err.status().map(|status| status.as_u16()),
            SearchError::Decode(_) => None,
        }
    }

    /// True for the transport kind (bad status or no connection).
    pub fn is_transport(&self) -> bool {
        matches!(self, SearchError::HttpStatus { .. } | SearchError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_mention_the_code() {
        let err = SearchError::HttpStatus { status: 403 };
        assert_eq!(err.to_string(), "Failed to fetch results (403)");
        assert_eq!(err.status(), Some(403));
        assert!(err.is_transport());
    }

    #[test]
    fn decode_errors_are_not_transport() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SearchError::from(source);
        assert!(!err.is_transport());
        assert_eq!(err.status(), None);
    }
}
