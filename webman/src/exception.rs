//! Rendering of errors as JSON responses.
//!
//! Every error becomes a `200` response whose body carries the real status in
//! `code`. Clients only see the error's own message when its kind is on the
//! allow-list or the handler runs in debug mode.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::config::WebmanConfig;

/// Message shown for errors that are not allow-listed outside debug mode.
pub const GENERIC_MESSAGE: &str = "server internal error";

/// Code used when an error carries none.
pub const DEFAULT_CODE: i64 = 500;

const FALLBACK_BODY: &str = r#"{"code": 500, "msg": "server internal error"}"#;

/// Classification of errors handled by [`ExceptionHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Business,
    NotFound,
    ClassNotFound,
    FuncNotFound,
    Validate,
    File,
    InvalidArgument,
    BadMethodCall,
    BadFunctionCall,
    Domain,
    Length,
    OutOfRange,
    Overflow,
    Range,
    Underflow,
    UnexpectedValue,
    Logic,
    Runtime,
    /// Anything else. Never allow-listed by default.
    Internal,
}

impl ErrorKind {
    /// Kinds whose messages are safe to show to clients.
    pub const DEFAULT_ALLOW_LIST: &'static [ErrorKind] = &[
        ErrorKind::Business,
        ErrorKind::NotFound,
        ErrorKind::ClassNotFound,
        ErrorKind::FuncNotFound,
        ErrorKind::Validate,
        ErrorKind::File,
        ErrorKind::InvalidArgument,
        ErrorKind::BadMethodCall,
        ErrorKind::BadFunctionCall,
        ErrorKind::Domain,
        ErrorKind::Length,
        ErrorKind::OutOfRange,
        ErrorKind::Overflow,
        ErrorKind::Range,
        ErrorKind::Underflow,
        ErrorKind::UnexpectedValue,
        ErrorKind::Logic,
        ErrorKind::Runtime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "BusinessException",
            Self::NotFound => "NotFoundException",
            Self::ClassNotFound => "ClassNotFoundException",
            Self::FuncNotFound => "FuncNotFoundException",
            Self::Validate => "ValidateException",
            Self::File => "FileException",
            Self::InvalidArgument => "InvalidArgumentException",
            Self::BadMethodCall => "BadMethodCallException",
            Self::BadFunctionCall => "BadFunctionCallException",
            Self::Domain => "DomainException",
            Self::Length => "LengthException",
            Self::OutOfRange => "OutOfRangeException",
            Self::Overflow => "OverflowException",
            Self::Range => "RangeException",
            Self::Underflow => "UnderflowException",
            Self::UnexpectedValue => "UnexpectedValueException",
            Self::Logic => "LogicException",
            Self::Runtime => "RuntimeException",
            Self::Internal => "InternalError",
        }
    }

    /// The kind this one specializes, following the standard exception tree.
    pub fn parent(&self) -> Option<ErrorKind> {
        match self {
            Self::InvalidArgument
            | Self::Domain
            | Self::Length
            | Self::OutOfRange
            | Self::BadFunctionCall => Some(Self::Logic),
            Self::BadMethodCall => Some(Self::BadFunctionCall),
            Self::Overflow | Self::Range | Self::Underflow | Self::UnexpectedValue => {
                Some(Self::Runtime)
            }
            _ => None,
        }
    }

    /// Whether this kind is `ancestor` or descends from it.
    pub fn is_a(&self, ancestor: ErrorKind) -> bool {
        let mut kind = Some(*self);
        while let Some(current) = kind {
            if current == ancestor {
                return true;
            }
            kind = current.parent();
        }
        false
    }
}

/// An error that knows how it should be presented to clients.
pub trait HandledError: std::error::Error {
    fn kind(&self) -> ErrorKind;

    /// Response code; `0` means "none" and renders as [`DEFAULT_CODE`].
    fn code(&self) -> i64 {
        0
    }

    /// A fully custom response. Only consulted for [`ErrorKind::Business`].
    fn render_response(&self) -> Option<JsonResponse> {
        None
    }
}

/// A rendered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl JsonResponse {
    /// A `200` response with JSON and cache-disabling headers.
    pub fn ok(body: String) -> Self {
        Self {
            status: 200,
            headers: vec![
                (
                    "Content-Type".to_string(),
                    "application/json; charset=utf-8".to_string(),
                ),
                ("Cache-Control".to_string(), "no-cache".to_string()),
                ("Pragma".to_string(), "no-cache".to_string()),
            ],
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: i64,
    msg: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    traces: Option<String>,
}

/// Maps errors to JSON responses and decides which ones get logged.
#[derive(Debug, Clone)]
pub struct ExceptionHandler {
    debug: bool,
    allow_list: Vec<ErrorKind>,
    dont_report: Vec<ErrorKind>,
}

impl ExceptionHandler {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            allow_list: ErrorKind::DEFAULT_ALLOW_LIST.to_vec(),
            dont_report: vec![ErrorKind::Business],
        }
    }

    pub fn from_config(config: &WebmanConfig) -> Self {
        Self::new(config.debug)
    }

    pub fn with_allow_list(mut self, allow_list: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.allow_list = allow_list.into_iter().collect();
        self
    }

    pub fn with_dont_report(mut self, dont_report: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.dont_report = dont_report.into_iter().collect();
        self
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Whether the kind of `err`, or any kind it descends from, is allow-listed.
    pub fn is_allow_listed(&self, err: &dyn HandledError) -> bool {
        let kind = err.kind();
        self.allow_list.iter().any(|listed| kind.is_a(*listed))
    }

    pub fn should_report(&self, err: &dyn HandledError) -> bool {
        let kind = err.kind();
        !self.dont_report.iter().any(|excluded| kind.is_a(*excluded))
    }

    /// Log `err` unless its kind is excluded from reporting.
    pub fn report(&self, err: &dyn HandledError) {
        if !self.should_report(err) {
            return;
        }
        tracing::error!(
            kind = err.kind().as_str(),
            code = err.code(),
            error = %err,
            "unhandled error"
        );
    }

    pub fn render(&self, err: &dyn HandledError) -> JsonResponse {
        if err.kind() == ErrorKind::Business
            && let Some(response) = err.render_response()
        {
            return response;
        }

        let message = err.to_string();
        let msg = if self.debug || self.is_allow_listed(err) {
            message.as_str()
        } else {
            GENERIC_MESSAGE
        };
        let body = ErrorBody {
            code: match err.code() {
                0 => DEFAULT_CODE,
                code => code,
            },
            msg,
            traces: self.debug.then(|| traces(err)),
        };

        JsonResponse::ok(pretty_json(&body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to encode error body");
            FALLBACK_BODY.to_string()
        }))
    }
}

/// Kind, message and the full `source()` chain.
fn traces(err: &dyn HandledError) -> String {
    let mut out = format!("{}: {err}", err.kind().as_str());
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\nCaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Four-space indented JSON with Unicode and slashes left unescaped.
fn pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
