//! Auto-detect Elasticsearch server version via HTTP.
//!
//! This crate provides utilities to detect the Elasticsearch server version
//! by querying the endpoint root. This is used to select the appropriate
//! search dialect (v5, v6 or v7) since their pagination and path conventions
//! are incompatible.

use reqwest::Client;
use semver::Version;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while detecting or classifying a server version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Failed to detect Elasticsearch version at '{endpoint}': {reason}")]
    DetectionFailed { endpoint: String, reason: String },

    #[error("Unsupported Elasticsearch version: {0}. Only v5, v6 and v7 are supported.")]
    Unsupported(String),
}

/// Detected Elasticsearch major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EsMajorVersion {
    /// Elasticsearch 5.x
    V5,
    /// Elasticsearch 6.x
    V6,
    /// Elasticsearch 7.x
    V7,
}

impl std::fmt::Display for EsMajorVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V5 => write!(f, "v5"),
            Self::V6 => write!(f, "v6"),
            Self::V7 => write!(f, "v7"),
        }
    }
}

/// Version reported by a server, as returned in `version.number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsVersion {
    /// The raw version string, e.g. "6.2.4".
    pub number: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl EsVersion {
    /// Classify this version into one of the supported dialects.
    pub fn major_version(&self) -> Result<EsMajorVersion, VersionError> {
        match self.major {
            5 => Ok(EsMajorVersion::V5),
            6 => Ok(EsMajorVersion::V6),
            7 => Ok(EsMajorVersion::V7),
            _ => Err(VersionError::Unsupported(self.number.clone())),
        }
    }
}

impl std::fmt::Display for EsVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.number)
    }
}

#[derive(Deserialize)]
struct InfoResponse {
    version: Option<VersionInfo>,
}

#[derive(Deserialize)]
struct VersionInfo {
    number: Option<String>,
}

/// Auto-detect the server version via HTTP GET to the endpoint root.
///
/// # Arguments
///
/// * `client` - HTTP client to issue the probe with
/// * `endpoint` - Base URL of the server (scheme, host and port)
/// * `username` / `password` - Optional basic-auth credentials
///
/// # Example response
///
/// ```text
/// { "name": "node-1", "version": { "number": "6.2.4" }, "tagline": "You Know, for Search" }
/// ```
pub async fn detect_server_version(
    client: &Client,
    endpoint: &str,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<EsVersion, VersionError> {
    let detection_failed = |reason: String| VersionError::DetectionFailed {
        endpoint: endpoint.to_string(),
        reason,
    };

    tracing::debug!("Detecting Elasticsearch version at {endpoint}");

    let mut request = client.get(endpoint);
    if username.is_some() || password.is_some() {
        request = request.basic_auth(username.unwrap_or_default(), password);
    }

    let response = request
        .send()
        .await
        .map_err(|e| detection_failed(format!("request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(detection_failed(format!("endpoint returned status {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| detection_failed(format!("failed to read response: {e}")))?;

    parse_version_info(&body).map_err(|e| match e {
        VersionError::DetectionFailed { reason, .. } => detection_failed(reason),
        other => other,
    })
}

/// Parse the body returned by the endpoint root and extract the version.
///
/// Unsupported majors are not rejected here; see [`EsVersion::major_version`].
pub fn parse_version_info(body: &str) -> Result<EsVersion, VersionError> {
    let detection_failed = |reason: String| VersionError::DetectionFailed {
        endpoint: String::new(),
        reason,
    };

    let info: InfoResponse = serde_json::from_str(body)
        .map_err(|e| detection_failed(format!("invalid info response: {e}")))?;

    let number = info
        .version
        .and_then(|v| v.number)
        .ok_or_else(|| detection_failed("response has no version.number".to_string()))?;

    let version = parse_version_number(&number)?;

    tracing::debug!(
        "Detected Elasticsearch server version: {} (major: {})",
        version.number,
        version.major
    );

    Ok(version)
}

/// Parse a version number like "6.2.4" or "7.0.0-beta1".
pub fn parse_version_number(number: &str) -> Result<EsVersion, VersionError> {
    let number = number.trim();

    // Parse semver (handles pre-release like -beta1 / -rc2)
    let version = Version::parse(number).map_err(|e| VersionError::DetectionFailed {
        endpoint: String::new(),
        reason: format!("failed to parse version '{number}': {e}"),
    })?;

    Ok(EsVersion {
        number: number.to_string(),
        major: version.major,
        minor: version.minor,
        patch: version.patch,
    })
}
