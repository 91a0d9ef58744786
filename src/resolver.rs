//! Selecting the document source matching an endpoint's version.

use crate::error::CompareError;
use es5_source::Es5Source;
use es6_source::Es6Source;
use es7_source::Es7Source;
use es_source::{DocumentSource, EndpointConfig, EsMajorVersion, Transport};
use es_version::{detect_server_version, VersionError};
use std::sync::Arc;

/// Probe `endpoint` once and return the document source for its version.
///
/// Single attempt; any failure is fatal to the run.
pub async fn resolve(endpoint: &EndpointConfig) -> Result<Arc<dyn DocumentSource>, CompareError> {
    let transport = Transport::new(endpoint.clone())
        .map_err(|e| CompareError::Configuration(e.to_string()))?;

    let version = detect_server_version(
        transport.client(),
        endpoint.base_url(),
        endpoint.username(),
        endpoint.password(),
    )
    .await
    .map_err(|e| version_error(endpoint, e))?;

    let major = version
        .major_version()
        .map_err(|e| version_error(endpoint, e))?;

    tracing::info!("{endpoint}: Elasticsearch {version} ({major} dialect)");

    let source: Arc<dyn DocumentSource> = match major {
        EsMajorVersion::V5 => Arc::new(Es5Source::new(transport, version)),
        EsMajorVersion::V6 => Arc::new(Es6Source::new(transport, version)),
        EsMajorVersion::V7 => Arc::new(Es7Source::new(transport, version)),
    };
    Ok(source)
}

fn version_error(endpoint: &EndpointConfig, error: VersionError) -> CompareError {
    match error {
        VersionError::DetectionFailed { reason, .. } => CompareError::VersionDetectionFailed {
            endpoint: endpoint.to_string(),
            reason,
        },
        VersionError::Unsupported(version) => CompareError::UnsupportedVersion {
            endpoint: endpoint.to_string(),
            version,
        },
    }
}
