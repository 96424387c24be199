use crate::protocol::r#return::ResponseCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the client core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Endpoint is not `grpc://host:port` or `grpcs://host:port`.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Rejected before any RPC was attempted.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("abi parse error: {0}")]
    AbiParse(String),
    /// A value does not fit the ABI type it is encoded as.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    /// The node returned a contract without an ABI.
    #[error("contract {0} has no abi")]
    AbiMissing(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("client is closed")]
    ClientClosed,
    #[error("deadline exceeded")]
    Deadline,
    #[error("operation cancelled")]
    Cancelled,
    #[error("connection error: {0}")]
    Connection(String),
    /// Transport failure, wrapped with the operation label.
    #[error("{label}: {status}")]
    Rpc {
        label: String,
        #[source]
        status: tonic::Status,
    },
    /// A build RPC answered with `result = false`.
    #[error("{label}: build rejected: code={code:?} message={message}")]
    BuildRejected {
        label: String,
        code: ResponseCode,
        message: String,
    },
    #[error("signing failed: {0}")]
    Signing(String),
    /// The broadcast RPC failed after `txid` was signed; the transaction may still land.
    #[error("{source} (txid {txid})")]
    Broadcast {
        txid: String,
        #[source]
        source: Box<Error>,
    },
    /// Any other error raised while serving the labelled operation.
    #[error("{label}: {source}")]
    Op {
        label: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attaches the operation label unless the error already carries one.
    pub(crate) fn labelled(label: &str, err: Error) -> Error {
        match err {
            e @ (Error::Rpc { .. }
            | Error::BuildRejected { .. }
            | Error::Broadcast { .. }
            | Error::Op { .. }) => e,
            other => Error::Op {
                label: label.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, past any operation labels.
    pub fn root(&self) -> &Error {
        match self {
            Error::Op { source, .. } | Error::Broadcast { source, .. } => source.root(),
            other => other,
        }
    }

    /// Hex txid of a transaction whose broadcast failed.
    pub fn txid(&self) -> Option<&str> {
        match self {
            Error::Broadcast { txid, .. } => Some(txid),
            Error::Op { source, .. } => source.txid(),
            _ => None,
        }
    }

    pub(crate) fn rpc(label: &str, status: tonic::Status) -> Error {
        Error::Rpc {
            label: label.to_string(),
            status,
        }
    }

    pub fn is_deadline(&self) -> bool {
        matches!(self.root(), Error::Deadline)
    }

    /// True for `Deadline` and `Cancelled`.
    pub fn is_interrupted(&self) -> bool {
        matches!(self.root(), Error::Deadline | Error::Cancelled)
    }
}

impl From<tonic::transport::Error> for Error {
    fn from(err: tonic::transport::Error) -> Self {
        Error::Connection(err.to_string())
    }
}

impl From<prost::DecodeError> for Error {
    fn from(err: prost::DecodeError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<k256::ecdsa::Error> for Error {
    fn from(err: k256::ecdsa::Error) -> Self {
        Error::Signing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_is_prefixed_with_label() {
        let err = Error::rpc("get account", tonic::Status::unavailable("node down"));
        let s = err.to_string();
        assert!(s.starts_with("get account: "), "{s}");
        assert!(s.contains("node down"), "{s}");
    }

    #[test]
    fn build_rejected_preserves_message() {
        let err = Error::BuildRejected {
            label: "trigger contract".to_string(),
            code: ResponseCode::ContractValidateError,
            message: "balance is not sufficient".to_string(),
        };
        assert!(err.to_string().contains("balance is not sufficient"));
    }

    #[test]
    fn labelled_keeps_deadline_kind() {
        let e = Error::labelled("simulate", Error::Deadline);
        assert!(e.is_deadline());
        assert_eq!(e.to_string(), "simulate: deadline exceeded");

        let e = Error::labelled("broadcast", Error::Connection("refused".into()));
        assert_eq!(e.to_string(), "broadcast: connection error: refused");
        assert!(matches!(e.root(), Error::Connection(_)));
    }

    #[test]
    fn labelled_does_not_double_wrap() {
        let e = Error::labelled("a", Error::rpc("a", tonic::Status::internal("x")));
        assert!(matches!(e, Error::Rpc { .. }));
    }

    #[test]
    fn broadcast_failure_keeps_txid_and_kind() {
        let e = Error::Broadcast {
            txid: "ab".repeat(32),
            source: Box::new(Error::labelled("broadcast transaction", Error::Deadline)),
        };
        assert_eq!(e.txid(), Some("ab".repeat(32).as_str()));
        assert!(e.is_deadline());
        assert!(e.to_string().starts_with("broadcast transaction: deadline exceeded"));
        assert!(matches!(Error::labelled("invoke", e), Error::Broadcast { .. }));
        assert_eq!(Error::Deadline.txid(), None);
    }
}
