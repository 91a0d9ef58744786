//! Endpoint descriptors parsed from URLs.

use crate::error::{Result, SourceError};
use percent_encoding::percent_decode_str;
use reqwest::Url;

/// Connection details for one endpoint.
///
/// Parsed from URLs of the form `http[s]://[user:pass@]host:port[/index[/type]]`.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    base_url: String,
    index: Option<String>,
    doc_type: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl EndpointConfig {
    /// Parse an endpoint URL.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|e| SourceError::Configuration(format!("invalid URL '{raw}': {e}")))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(SourceError::Configuration(format!(
                    "unsupported scheme '{other}' in '{raw}', expected http or https"
                )))
            }
        }

        let host = url
            .host_str()
            .ok_or_else(|| SourceError::Configuration(format!("missing host in '{raw}'")))?;

        let base_url = match url.port() {
            Some(port) => format!("{}://{host}:{port}", url.scheme()),
            None => format!("{}://{host}", url.scheme()),
        };

        let segments: Vec<String> = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let (index, doc_type) = match segments.as_slice() {
            [] => (None, None),
            [index] => (Some(index.clone()), None),
            [index, doc_type] => (Some(index.clone()), Some(doc_type.clone())),
            _ => {
                return Err(SourceError::Configuration(format!(
                    "too many path segments in '{raw}', expected /index or /index/type"
                )))
            }
        };

        let username = Some(url.username())
            .filter(|u| !u.is_empty())
            .map(|u| decode_credential(u, "username"))
            .transpose()?;
        let password = url
            .password()
            .map(|p| decode_credential(p, "password"))
            .transpose()?;

        Ok(Self {
            base_url,
            index,
            doc_type,
            username,
            password,
        })
    }

    /// Placeholder endpoint for sources that never touch the network.
    pub(crate) fn in_memory(name: &str) -> Self {
        Self {
            base_url: format!("memory://{name}"),
            index: None,
            doc_type: None,
            username: None,
            password: None,
        }
    }

    /// Replace the credentials embedded in the URL.
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        if username.is_some() {
            self.username = username;
        }
        if password.is_some() {
            self.password = password;
        }
        self
    }

    /// Scheme, host and port, without credentials or path.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn doc_type(&self) -> Option<&str> {
        self.doc_type.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

impl std::fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base_url)?;
        if let Some(index) = &self.index {
            write!(f, "/{index}")?;
        }
        if let Some(doc_type) = &self.doc_type {
            write!(f, "/{doc_type}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url)
            .field("index", &self.index)
            .field("doc_type", &self.doc_type)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// `Url` keeps userinfo percent-encoded; basic auth needs the raw value.
fn decode_credential(raw: &str, what: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            SourceError::Configuration(format!("{what} in endpoint URL is not valid UTF-8: {e}"))
        })
}
