//! The token that travels along every edge: success or failure, each
//! carrying a [`Datum`].

use crate::datum::{Datum, ErrorKind};

#[derive(Clone, Debug, PartialEq)]
pub enum CResult {
    Success(Datum),
    /// Failure is the only way to signal error on an edge. The payload is
    /// almost always a `Datum::Error`, with one documented exception: the
    /// external-completion `/fail` route carries the raw `HttpReq` the
    /// caller posted as the failure payload, not a synthesized error datum.
    Failure(Datum),
}

impl CResult {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure(Datum::error(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn datum(&self) -> &Datum {
        match self {
            Self::Success(datum) | Self::Failure(datum) => datum,
        }
    }

    pub fn into_datum(self) -> Datum {
        match self {
            Self::Success(datum) | Self::Failure(datum) => datum,
        }
    }
}
