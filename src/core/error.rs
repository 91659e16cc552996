use std::time::Duration;
use thiserror::Error;

/// Log fragments emitted by ibc-go when it refuses a relay message outright: another relayer
/// already advanced the state, or the packet can no longer be received.
const REFUSED_RELAY_LOGS: &[&str] = &[
    "packet messages are redundant",
    "packet already received",
    "acknowledgement for packet already exists",
    "packet commitment not found",
    "packet sequence is already",
    "packet timeout",
];

#[derive(Debug, Error)]
pub enum Error {
    /// A chain event is missing a required attribute or carries a malformed one.
    #[error("failed to parse event #{index}: attribute `{field}` {reason}")]
    Parse {
        index: usize,
        field: String,
        reason: String,
    },
    #[error("timeout policy violation: {0}")]
    TimeoutPolicyViolation(String),
    /// Transient submission failure, retried with backoff.
    #[error("failed to submit to {chain}: {reason}")]
    ChainSubmit { chain: String, reason: String },
    /// The chain refused the message, usually because it was already relayed.
    #[error("{chain} rejected the message: {reason}")]
    ChainReject { chain: String, reason: String },
    #[error("connection handshake between {chain_a} and {chain_b} failed: {reason}")]
    Handshake {
        chain_a: String,
        chain_b: String,
        reason: String,
    },
    #[error("client {client_id} on {chain} is stale ({age:?} old)")]
    ClientStale {
        chain: String,
        client_id: String,
        age: Duration,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid transaction log: {0}")]
    InvalidLog(String),
    #[error("rpc error: {0}")]
    RpcError(String),
    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn parse(index: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            index,
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_attribute(index: usize, field: impl Into<String>) -> Self {
        Self::parse(index, field, "is missing")
    }

    /// Classifies a failed transaction by its log. Refused relays become
    /// [`Error::ChainReject`], everything else [`Error::ChainSubmit`].
    pub fn from_tx_failure(chain: impl Into<String>, code: u32, log: &str) -> Self {
        let chain = chain.into();
        let reason = format!("code {}: {}", code, log);
        if REFUSED_RELAY_LOGS.iter().any(|fragment| log.contains(fragment)) {
            Error::ChainReject { chain, reason }
        } else {
            Error::ChainSubmit { chain, reason }
        }
    }

    /// Network or node level failures that are worth retrying after a backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::ChainSubmit { .. } | Error::RpcError(_))
    }

    pub fn is_reject(&self) -> bool {
        matches!(self, Error::ChainReject { .. })
    }

    /// Errors that must terminate the relay loop for the affected link.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::TimeoutPolicyViolation(_) | Error::Handshake { .. }
        )
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Self::Custom(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidLog(error.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redundant_relay_is_a_rejection() {
        let err = Error::from_tx_failure(
            "juno-1",
            22,
            "failed to execute message; message index: 0: packet messages are redundant",
        );
        assert!(err.is_reject());
        assert!(!err.is_transient());

        let err = Error::from_tx_failure(
            "nois-1",
            1,
            "receive packet verification failed: packet timeout: block height >= packet timeout height",
        );
        assert!(err.is_reject());

        let err = Error::from_tx_failure("juno-1", 11, "out of gas in location: ReadFlat");
        assert!(err.is_transient());
        assert!(!err.is_reject());
    }

    #[test]
    fn parse_error_names_index_and_field() {
        let err = Error::missing_attribute(12, "packet_sequence");
        assert_eq!(
            err.to_string(),
            "failed to parse event #12: attribute `packet_sequence` is missing"
        );
        assert!(!err.is_fatal());
        assert!(Error::Config("src == dest".into()).is_fatal());
    }
}
