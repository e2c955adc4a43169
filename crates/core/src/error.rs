//! Error types for the catalog engine.
//!
//! Fetch failures and data-integrity problems are typed so callers can tell
//! a retryable outage apart from a malformed record. Configuration and file
//! handling use `anyhow` instead.

use thiserror::Error;

/// Failure to obtain a dataset from the catalog service.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Endpoint that was requested.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Endpoint that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded into the expected records.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// Endpoint that was requested.
        url: String,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The service is not reachable for a reason outside the HTTP layer.
    #[error("catalog service unavailable: {0}")]
    Unavailable(String),
}

/// Record-level integrity problems found while building table rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A field required to render the record is absent.
    #[error("record {id} is missing mandatory field `{field}`")]
    MissingField {
        /// Identifier of the offending record.
        id: u32,
        /// Name of the absent field.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = ConnectivityError::Status {
            url: "https://example.com/territories".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "https://example.com/territories returned HTTP 503");

        let err = TableError::MissingField {
            id: 12,
            field: "denomination",
        };
        assert_eq!(err.to_string(), "record 12 is missing mandatory field `denomination`");
    }

    #[test]
    fn decode_error_keeps_its_cause() {
        let source = serde_json::from_str::<Vec<u32>>("[1, \"two\"]").unwrap_err();
        let expected = source.to_string();
        let err = ConnectivityError::Decode {
            url: "https://example.com/currencies".to_string(),
            source,
        };
        let cause = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(cause, Some(expected));
        assert!(err
            .to_string()
            .starts_with("failed to decode response from https://example.com/currencies: "));
    }
}
