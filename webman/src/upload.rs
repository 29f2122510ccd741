//! Single-file uploads.
//!
//! Files land in `<base_dir>/<relative_dir_prefix>/<YYYYMMDD>/` under a random
//! name built from the upload time and a 16-bit nonce.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rand::Rng;
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::UploadConfig;
use crate::error::{Result, WebmanError};

/// Extensions that are never accepted, whatever the accept list says.
pub const FORBIDDEN_EXTENSIONS: &[&str] =
    &["php", "php3", "php5", "css", "js", "html", "htm", "asp", "jsp"];

const BLOB_NAME: &str = "blob";

/// A file received with a request, before it is moved into place.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as sent by the client
    pub client_name: String,
    /// Extension as sent by the client, if any
    pub client_extension: Option<String>,
    pub client_mime_type: String,
    pub size: u64,
    /// Temporary location of the received bytes
    pub path: PathBuf,
    /// Whether the transfer completed without error
    pub valid: bool,
}

impl UploadedFile {
    /// A completed upload whose extension is taken from `client_name`.
    pub fn new(client_name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        let client_name = client_name.into();
        let client_extension = Path::new(&client_name)
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());
        Self {
            client_name,
            client_extension,
            client_mime_type: String::new(),
            size,
            path: path.into(),
            valid: true,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.client_mime_type = mime_type.into();
        self
    }

    /// Lowercased extension; unnamed `blob` uploads fall back to the MIME subtype.
    pub fn extension(&self) -> String {
        let ext = match self.client_extension.as_deref() {
            Some(ext) if !ext.is_empty() => ext.to_string(),
            _ if self.client_name == BLOB_NAME => self
                .client_mime_type
                .split_once('/')
                .map(|(_, subtype)| subtype.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };
        ext.to_ascii_lowercase()
    }
}

/// Where and how an upload was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredUpload {
    pub url: String,
    pub name: String,
    pub realpath: PathBuf,
    pub size: u64,
    pub mime_type: String,
    pub image_width: u32,
    pub image_height: u32,
    pub ext: String,
}

impl StoredUpload {
    /// The client-facing success payload.
    pub fn summary(&self) -> Value {
        json!({
            "code": 0,
            "data": {
                "url": self.url,
                "name": self.name,
                "size": self.size,
            },
            "msg": "上传成功",
        })
    }

    /// The client-facing payload when a request carried no usable file.
    ///
    /// Unlike the `未找到上传文件` error from [`Uploader::store`], this is a
    /// regular body with `code: 1` for endpoints that answer without raising.
    pub fn missing_file_response() -> Value {
        json!({
            "code": 1,
            "data": [],
            "msg": "未找到文件",
        })
    }
}

/// Validates and stores uploads according to an [`UploadConfig`].
#[derive(Debug, Clone)]
pub struct Uploader {
    config: UploadConfig,
}

impl Uploader {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Store the first of `files`, using the current time and a random nonce.
    pub fn store(
        &self,
        method: &str,
        files: impl IntoIterator<Item = UploadedFile>,
    ) -> Result<StoredUpload> {
        let nonce = rand::rng().random_range(1..=u16::MAX);
        self.store_at(method, files, Local::now(), nonce)
    }

    /// Store the first of `files` as if uploaded at `now`.
    pub fn store_at(
        &self,
        method: &str,
        files: impl IntoIterator<Item = UploadedFile>,
        now: DateTime<Local>,
        nonce: u16,
    ) -> Result<StoredUpload> {
        if !method.eq_ignore_ascii_case("POST") {
            return Err(WebmanError::business("上传文件时仅支持POST请求", 200));
        }

        let file = match files.into_iter().next() {
            Some(file) if file.valid => file,
            _ => return Err(WebmanError::business("未找到上传文件", 400)),
        };

        let ext = file.extension();
        self.check_extension(&ext)?;

        let relative_dir = self.relative_dir(now);
        let full_dir = self.config.base_dir.join(&relative_dir);
        fs::create_dir_all(&full_dir)
            .map_err(|e| WebmanError::io("create directory", &full_dir, e))?;

        let file_name = stored_file_name(now.timestamp(), nonce, &ext);
        let relative_path = if relative_dir.is_empty() {
            file_name.clone()
        } else {
            format!("{relative_dir}/{file_name}")
        };
        let full_path = full_dir.join(&file_name);
        move_file(&file.path, &full_path)?;

        let mut mime_type = file.client_mime_type.clone();
        if mime_type.is_empty() {
            mime_type = mime_guess::from_ext(&ext)
                .first_or_octet_stream()
                .essence_str()
                .to_string();
        }
        let (image_width, image_height) = match image_info(&full_path) {
            Some((width, height, sniffed)) => {
                mime_type = sniffed.to_string();
                (width, height)
            }
            None => (0, 0),
        };

        let url = format!("{}{relative_path}", self.url_prefix());
        tracing::info!(url = %url, size = file.size, ext = %ext, "stored upload");

        Ok(StoredUpload {
            url,
            name: file.client_name,
            realpath: full_path,
            size: file.size,
            mime_type,
            image_width,
            image_height,
            ext,
        })
    }

    fn check_extension(&self, ext: &str) -> Result<()> {
        if FORBIDDEN_EXTENSIONS.contains(&ext) {
            tracing::warn!(ext = %ext, "rejected upload with forbidden extension");
            return Err(WebmanError::business("不支持该格式的文件上传", 400));
        }

        let accept = &self.config.accept_extensions;
        if !accept.is_empty() && !accept.iter().any(|allowed| allowed == ext) {
            tracing::warn!(ext = %ext, "rejected upload with unaccepted extension");
            return Err(WebmanError::business("不支持该扩展名的文件上传", 400));
        }

        Ok(())
    }

    fn relative_dir(&self, now: DateTime<Local>) -> String {
        let date = now.format("%Y%m%d");
        match self.config.relative_dir_prefix.trim_matches('/') {
            "" => date.to_string(),
            prefix => format!("{prefix}/{date}"),
        }
    }

    /// `/prefix/` with slashes on both sides, or `/` when empty.
    fn url_prefix(&self) -> String {
        match self.config.url_prefix.trim_matches('/') {
            "" => "/".to_string(),
            prefix => format!("/{prefix}/"),
        }
    }
}

/// Hex of the 32-bit big-endian timestamp followed by the 16-bit nonce.
pub fn stored_file_name(timestamp: i64, nonce: u16, ext: &str) -> String {
    // The timestamp wraps to 32 bits like an unsigned long pack.
    let secs = timestamp as u32;
    format!("{secs:08x}{nonce:04x}.{ext}")
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| WebmanError::io("copy upload to", to, e))?;
    fs::remove_file(from).map_err(|e| WebmanError::io("remove temporary upload", from, e))
}

/// Width, height and MIME type when `path` is a decodable image.
fn image_info(path: &Path) -> Option<(u32, u32, &'static str)> {
    let reader = image::ImageReader::open(path).ok()?.with_guessed_format().ok()?;
    let format = reader.format()?;
    let (width, height) = reader.into_dimensions().ok()?;
    Some((width, height, format.to_mime_type()))
}
