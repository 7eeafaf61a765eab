use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("config conflict: {0}")]
    ConfigConflict(String),

    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("{0}")]
    NotFound(String),

    #[error("HTTP {status} for {url}")]
    HttpStatusFailure { status: u16, url: String },
}

impl DiscoveryError {
    /// Get the kind/category of this error.
    pub fn kind(&self) -> DiscoveryErrorKind {
        match self {
            DiscoveryError::ConfigConflict(_) => DiscoveryErrorKind::ConfigConflict,
            DiscoveryError::MalformedUrl(_) => DiscoveryErrorKind::MalformedUrl,
            DiscoveryError::TransportFailure(_) => DiscoveryErrorKind::TransportFailure,
            DiscoveryError::NotFound(_) => DiscoveryErrorKind::NotFound,
            DiscoveryError::HttpStatusFailure { .. } => DiscoveryErrorKind::HttpStatusFailure,
        }
    }

    /// Classify an anyhow error (config loading, collaborator setup, or a
    /// DiscoveryError passed through `?`), falling back to io::Error kinds.
    pub fn classify(err: &anyhow::Error) -> DiscoveryErrorKind {
        if let Some(de) = err.downcast_ref::<DiscoveryError>() {
            return de.kind();
        }
        if err.downcast_ref::<std::io::Error>().is_some() {
            return DiscoveryErrorKind::TransportFailure;
        }
        DiscoveryErrorKind::Other
    }
}

/// Lightweight error category for pattern matching without borrowing the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryErrorKind {
    ConfigConflict,
    MalformedUrl,
    TransportFailure,
    NotFound,
    HttpStatusFailure,
    Other,
}

impl DiscoveryErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryErrorKind::ConfigConflict => "CONFIG_CONFLICT",
            DiscoveryErrorKind::MalformedUrl => "MALFORMED_URL",
            DiscoveryErrorKind::TransportFailure => "TRANSPORT",
            DiscoveryErrorKind::NotFound => "NOT_FOUND",
            DiscoveryErrorKind::HttpStatusFailure => "HTTP_STATUS",
            DiscoveryErrorKind::Other => "OTHER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = DiscoveryError::NotFound("WPAD not found via DNS".to_string());
        assert_eq!(err.to_string(), "WPAD not found via DNS");

        let err = DiscoveryError::HttpStatusFailure {
            status: 404,
            url: "http://wpad.example.com/wpad.dat".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 404 for http://wpad.example.com/wpad.dat"
        );
    }

    #[test]
    fn kind_mapping() {
        assert_eq!(
            DiscoveryError::ConfigConflict("x".into()).kind(),
            DiscoveryErrorKind::ConfigConflict
        );
        assert_eq!(
            DiscoveryError::TransportFailure("x".into()).kind().as_str(),
            "TRANSPORT"
        );
    }

    #[test]
    fn classify_io_and_wrapped() {
        let io: anyhow::Error =
            std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out").into();
        assert_eq!(
            DiscoveryError::classify(&io),
            DiscoveryErrorKind::TransportFailure
        );

        let wrapped: anyhow::Error = DiscoveryError::MalformedUrl("nope".into()).into();
        assert_eq!(
            DiscoveryError::classify(&wrapped),
            DiscoveryErrorKind::MalformedUrl
        );

        let other = anyhow::anyhow!("something else");
        assert_eq!(DiscoveryError::classify(&other), DiscoveryErrorKind::Other);
    }
}
