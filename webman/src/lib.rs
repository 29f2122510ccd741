//! Web application helpers built around [`ledc_attributes::Attributes`].
//!
//! - [`exception`]: errors rendered as `{code, msg, traces?}` JSON responses
//! - [`request`]: typed request parameter extraction
//! - [`upload`]: single-file upload validation and storage
//! - [`order_no`]: order-number builders and the [`IdGenerator`] seam
//! - [`git`]: commit metadata for version banners

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod error;
pub mod exception;
pub mod git;
pub mod order_no;
pub mod request;
pub mod upload;

pub use config::{UploadConfig, WebmanConfig};
pub use error::{Result, WebmanError};
pub use exception::{ErrorKind, ExceptionHandler, HandledError, JsonResponse};
pub use git::{current_git_commit, current_git_filemtime};
pub use order_no::{IdGenerator, order_number, order_number_at, short_order_number};
pub use request::{ParamSpec, Request, TypeCast};
pub use upload::{StoredUpload, UploadedFile, Uploader};

pub use ledc_attributes::{AttributeRecord, Attributes, AttributesError};
