use serde::Deserialize;
use thiserror::Error;

/// Failure of a Vercel operation.
#[derive(Debug, Error)]
pub enum VercelError {
    /// The domain cannot be placed into a request path.
    #[error("Invalid domain name: {0:?}")]
    InvalidDomain(String),

    /// A setting the operation needs is missing.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Connection, TLS or body read failure.
    #[error("Request to Vercel failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Any non-2xx response.
    #[error("Vercel API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to parse Vercel response: {0}")]
    Decode(String),
}

impl VercelError {
    /// Builds an [`VercelError::Api`] from a failed response body, using Vercel's
    /// `{"error": {"code", "message"}}` envelope when present.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<VercelErrorBody>(body) {
            Ok(parsed) => Self::Api {
                status,
                code: parsed.error.code,
                message: parsed.error.message,
            },
            Err(_) => Self::Api {
                status,
                code: String::new(),
                message: if body.trim().is_empty() {
                    "unknown".to_string()
                } else {
                    body.to_string()
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct VercelErrorBody {
    error: VercelErrorDetail,
}

#[derive(Debug, Deserialize)]
struct VercelErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vercel_error_envelope() {
        let err = VercelError::from_response(
            409,
            r#"{"error":{"code":"domain_already_in_use","message":"Domain is in use"}}"#,
        );
        match err {
            VercelError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, "domain_already_in_use");
                assert_eq!(message, "Domain is in use");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_raw_body() {
        let err = VercelError::from_response(502, "Bad Gateway");
        assert!(matches!(
            err,
            VercelError::Api { status: 502, ref message, .. } if message == "Bad Gateway"
        ));

        let err = VercelError::from_response(500, "");
        assert!(matches!(err, VercelError::Api { ref message, .. } if message == "unknown"));
    }
}
