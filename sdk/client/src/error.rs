use {
  crowdfund_primitives::{RecordError, UnitError},
  thiserror::Error,
};

/// Failures reported by the external collaborators (query, transaction
/// and identity channels).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
  /// The ledger executed the call and refused it.
  #[error("Reverted: {0}")]
  Reverted(String),

  #[error("Transport error: {0}")]
  Transport(String),

  #[error("Access to accounts was not granted")]
  NotAuthorized,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
  /// Malformed, negative or zero numeric input. Raised before any
  /// external call is made.
  #[error("Invalid amount: {0}")]
  InvalidAmount(String),

  #[error("{kind} #{index} not found, {count} exist")]
  NotFound {
    kind: &'static str,
    index: u64,
    count: u64,
  },

  #[error("Identity provider access was never granted")]
  NotAuthorized,

  /// The state machine of the contract did not allow the action at the
  /// time it executed.
  #[error("Precondition failed: {0}")]
  PreconditionFailed(String),

  /// The outcome is unknown to this client. A submission that failed this
  /// way may or may not have been applied.
  #[error("Transport failure: {0}")]
  TransportFailure(String),
}

impl From<ChannelError> for Error {
  fn from(value: ChannelError) -> Self {
    match value {
      ChannelError::Reverted(reason) => Error::PreconditionFailed(reason),
      ChannelError::Transport(reason) => Error::TransportFailure(reason),
      ChannelError::NotAuthorized => Error::NotAuthorized,
    }
  }
}

impl From<UnitError> for Error {
  fn from(value: UnitError) -> Self {
    Error::InvalidAmount(value.to_string())
  }
}

impl From<RecordError> for Error {
  fn from(value: RecordError) -> Self {
    Error::TransportFailure(format!("malformed ledger record: {value}"))
  }
}

impl From<rmp_serde::decode::Error> for Error {
  fn from(value: rmp_serde::decode::Error) -> Self {
    Error::TransportFailure(format!("undecodable ledger response: {value}"))
  }
}
