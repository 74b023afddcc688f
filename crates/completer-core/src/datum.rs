//! The tagged value type carried on every edge of a graph.

use serde::{Deserialize, Serialize};

/// Closed set of failure reasons a node can carry. Combinators match
/// exhaustively on this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    StageTimeout,
    StageInvokeFailed,
    FunctionInvokeFailed,
    /// Reserved for durable implementations; the in-memory engine never emits this.
    StageLost,
    InvalidStageResponse,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StageTimeout => "stage_timeout",
            Self::StageInvokeFailed => "stage_invoke_failed",
            Self::FunctionInvokeFailed => "function_invoke_failed",
            Self::StageLost => "stage_lost",
            Self::InvalidStageResponse => "invalid_stage_response",
            Self::UnknownError => "unknown_error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }
}

/// An ordered, multi-valued header bag. Preserves insertion order and
/// repeated keys so that `joined` can reproduce the ";"-joined form the
/// external-completion HttpReq datum requires.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First value for `key`, case-insensitive.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, case-insensitive, joined with ";" -- the
    /// multi-valued-header representation used when building the external
    /// completion's HttpReq datum.
    pub fn joined(&self, key: &str) -> Option<String> {
        let values: Vec<&str> = self
            .0
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(";"))
        }
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Datum {
    Blob {
        content_type: String,
        bytes: Vec<u8>,
    },
    Empty,
    Error {
        kind: ErrorKind,
        message: String,
    },
    HttpReq {
        method: HttpMethod,
        headers: Headers,
        body: Vec<u8>,
    },
    HttpResp {
        status_code: u16,
        headers: Headers,
        body: Vec<u8>,
    },
    StageRef {
        stage_id: String,
    },
}

impl Datum {
    pub fn blob(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Blob {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn stage_ref(stage_id: impl Into<String>) -> Self {
        Self::StageRef {
            stage_id: stage_id.into(),
        }
    }

    pub fn as_stage_ref(&self) -> Option<&str> {
        match self {
            Self::StageRef { stage_id } => Some(stage_id),
            _ => None,
        }
    }

    pub fn as_error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
