//! `reqwest`-based implementation of [`Backend`].

use std::time::Duration;

use async_trait::async_trait;
use gispub_core::RemoteEntity;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use url::Url;

use super::error::convert_reqwest_error;
use super::{
    Backend, BackendBuildError, IMPORT_ENCODING, ImportSubmission, Readiness, TemporaryUpload,
    TransportError, UploadBody,
};
use crate::staging::VectorFormat;

/// Default user agent for backend requests.
pub const DEFAULT_USER_AGENT: &str = "gispub/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const READINESS_PATH: &str = "/backend";
const ENTITIES_PATH: &str = "/backend/api/entities";
const IMPORT_PATH: &str = "/backend/api/import";
const LAYER_IMPORT_PATH: &str = "/backend/api/import/layer";

/// Configuration for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Backend host, e.g. `"http://localhost:8080"`.
    pub host: String,
    /// Request timeout. Uploads of large archives need a generous value.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8080".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpBackendConfig {
    /// Create a configuration for `host`.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP client for the import backend.
///
/// # Examples
/// ```
/// use gispub_data::{Backend, HttpBackend};
///
/// let backend = HttpBackend::new("http://localhost:8080/")?;
/// assert_eq!(backend.host(), "http://localhost:8080");
/// assert!(HttpBackend::new("not a url").is_err());
/// # Ok::<(), gispub_data::BackendBuildError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    host: String,
}

impl HttpBackend {
    /// Create a backend client with default settings.
    ///
    /// # Errors
    /// Returns [`BackendBuildError`] for hosts that are not absolute HTTP(S)
    /// URLs or when the client cannot be built.
    pub fn new(host: impl Into<String>) -> Result<Self, BackendBuildError> {
        Self::with_config(HttpBackendConfig::new(host))
    }

    /// Create a backend client from explicit configuration.
    ///
    /// # Errors
    /// Returns [`BackendBuildError`] for hosts that are not absolute HTTP(S)
    /// URLs or when the client cannot be built.
    pub fn with_config(config: HttpBackendConfig) -> Result<Self, BackendBuildError> {
        let host = config.host.trim_end_matches('/').to_owned();
        let parsed = Url::parse(&host).map_err(|source| BackendBuildError::InvalidHost {
            host: config.host.clone(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BackendBuildError::UnsupportedScheme { host: config.host });
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|source| BackendBuildError::HttpClient { source })?;
        Ok(Self { client, host })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.host)
    }

    fn file_part(
        file_name: &str,
        body: UploadBody,
        mime: &str,
        url: &str,
    ) -> Result<Part, TransportError> {
        let size = body.size();
        Part::stream_with_length(Body::wrap_stream(body.into_stream()), size)
            .file_name(file_name.to_owned())
            .mime_str(mime)
            .map_err(|err| convert_reqwest_error(err, url))
    }
}

const fn vector_mime(format: VectorFormat) -> &'static str {
    match format {
        VectorFormat::Shapefile => "application/zip",
        VectorFormat::GeoPackage => "application/geopackage+sqlite3",
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    fn host(&self) -> &str {
        &self.host
    }

    async fn check_readiness(&self) -> Readiness {
        let url = self.url(READINESS_PATH);
        match self.client.get(&url).send().await {
            Ok(response) if response.status() == StatusCode::BAD_GATEWAY => Readiness::NotReady {
                reason: format!("{url} answered 502 Bad Gateway"),
            },
            Ok(_) => Readiness::Ready,
            Err(err) => Readiness::NotReady {
                reason: err.to_string(),
            },
        }
    }

    async fn fetch_entities(&self) -> Result<Vec<RemoteEntity>, TransportError> {
        let url = self.url(ENTITIES_PATH);
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, &url))?
            .json()
            .await
            .map_err(|err| convert_reqwest_error(err, &url))
    }

    async fn upload_temporary(
        &self,
        file_name: &str,
        format: VectorFormat,
        body: UploadBody,
    ) -> Result<TemporaryUpload, TransportError> {
        let url = self.url(IMPORT_PATH);
        let form = Form::new()
            .text("type", format.as_str())
            .text("encoding", IMPORT_ENCODING)
            .part(
                "file",
                Self::file_part(file_name, body, vector_mime(format), &url)?,
            );
        self.client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, &url))?
            .json()
            .await
            .map_err(|err| convert_reqwest_error(err, &url))
    }

    async fn submit_import(&self, submission: &ImportSubmission) -> Result<(), TransportError> {
        let url = self.url(IMPORT_PATH);
        self.client
            .put(&url)
            .json(submission)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, &url))?;
        Ok(())
    }

    async fn upload_raster(&self, file_name: &str, body: UploadBody) -> Result<(), TransportError> {
        let url = self.url(LAYER_IMPORT_PATH);
        let part = Self::file_part(file_name, body, "image/tiff", &url)?;
        let form = Form::new().part("file", part);
        self.client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, &url))?;
        Ok(())
    }

    async fn refresh_bbox(&self, segment: &str) -> Result<(), TransportError> {
        let url = self.url(&format!("{ENTITIES_PATH}/{segment}/geom/restart"));
        self.client
            .put(&url)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, &url))?;
        Ok(())
    }
}
