//! Data-only values exchanged with the upstream streaming service. The
//! bridge does not interpret any of these; they are carried for the
//! components around it.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Per-fragment upload progress reported back by the ingestion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentAckType {
    /// Sentinel for "not specified".
    Undefined,
    /// Fragment started buffering on the ingestion host.
    Buffering,
    /// Fragment has been received and parsed.
    Received,
    /// Fragment has been persisted.
    Persisted,
    /// Fragment errored.
    Error,
    /// Keep-alive.
    Idle,
}

impl FragmentAckType {
    /// Decodes the wire value; unknown values are the caller's problem.
    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Undefined),
            1 => Some(Self::Buffering),
            2 => Some(Self::Received),
            3 => Some(Self::Persisted),
            4 => Some(Self::Error),
            5 => Some(Self::Idle),
            _ => None,
        }
    }

    pub fn as_int(self) -> i32 {
        match self {
            Self::Undefined => 0,
            Self::Buffering => 1,
            Self::Received => 2,
            Self::Persisted => 3,
            Self::Error => 4,
            Self::Idle => 5,
        }
    }
}

/// Out-parameters of one transport-layer read call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadResult {
    read_bytes: usize,
    end_of_stream: bool,
}

impl ReadResult {
    /// Upload handle value the transport uses for "no handle".
    pub const INVALID_UPLOAD_HANDLE: i64 = -1;

    /// Called by the transport layer to fill in the result in place.
    pub fn set(&mut self, read_bytes: usize, end_of_stream: bool) {
        self.read_bytes = read_bytes;
        self.end_of_stream = end_of_stream;
    }

    pub fn read_bytes(&self) -> usize {
        self.read_bytes
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }
}

/// Operator joining conditions in upstream query expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalOperator {
    And,
    Or,
}

impl Display for ConditionalOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse conditional operator from {0:?}")]
pub struct ParseOperatorError(String);

impl FromStr for ConditionalOperator {
    type Err = ParseOperatorError;

    /// Strict: empty or unknown input is an error, never a default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            other => Err(ParseOperatorError(other.to_string())),
        }
    }
}
