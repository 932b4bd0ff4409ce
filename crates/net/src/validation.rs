//! URL and HTTP response validation

use lwdump_errors::{Error, NetworkError};
use url::Url;

/// Validate URL and check for supported protocols
pub(crate) fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(NetworkError::UnsupportedProtocol {
            protocol: scheme.to_string(),
        }
        .into()),
    }
}

/// Reject non-2xx responses
pub(crate) fn validate_response(response: &reqwest::Response) -> Result<(), Error> {
    let status = response.status();

    if !status.is_success() {
        return Err(NetworkError::HttpError {
            status: status.as_u16(),
            message: status.to_string(),
        }
        .into());
    }

    Ok(())
}
