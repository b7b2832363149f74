//! Protocol resolution: map a URL's scheme onto the supported protocol set.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Wire protocols a download can be fetched over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
    Ftp,
    Sftp,
}

/// Why a URL was refused before planning. Never fatal: the URL is skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("malformed url: {0}")]
    Malformed(#[from] url::ParseError),
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [Protocol::Http, Protocol::Https, Protocol::Ftp, Protocol::Sftp];

    /// Resolve the protocol of `url` (trimmed). Scheme matching is case-insensitive.
    pub fn resolve(url: &str) -> Result<Protocol, Rejection> {
        let parsed = url::Url::parse(url.trim())?;
        Self::from_scheme(parsed.scheme())
            .ok_or_else(|| Rejection::UnsupportedScheme(parsed.scheme().to_string()))
    }

    pub fn from_scheme(scheme: &str) -> Option<Protocol> {
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(scheme))
    }

    /// Lower-case name, also the prefix of this protocol's config keys.
    pub fn key(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Ftp => "ftp",
            Protocol::Sftp => "sftp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key().to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_supported_schemes() {
        assert_eq!(Protocol::resolve("http://host/a.txt"), Ok(Protocol::Http));
        assert_eq!(Protocol::resolve("https://host/a.txt"), Ok(Protocol::Https));
        assert_eq!(Protocol::resolve("ftp://host/report.csv"), Ok(Protocol::Ftp));
        assert_eq!(
            Protocol::resolve("sftp://user:pw@host:2222/x.bin"),
            Ok(Protocol::Sftp)
        );
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(Protocol::resolve("HTTP://host/a"), Ok(Protocol::Http));
        assert_eq!(Protocol::resolve("  SfTp://host/a  "), Ok(Protocol::Sftp));
    }

    #[test]
    fn unknown_scheme_rejected() {
        assert_eq!(
            Protocol::resolve("gopher://host/x"),
            Err(Rejection::UnsupportedScheme("gopher".to_string()))
        );
    }

    #[test]
    fn malformed_rejected() {
        assert!(matches!(
            Protocol::resolve("not a url"),
            Err(Rejection::Malformed(_))
        ));
        assert!(matches!(
            Protocol::resolve("http://"),
            Err(Rejection::Malformed(_))
        ));
    }

    #[test]
    fn display_is_upper_case() {
        assert_eq!(Protocol::Sftp.to_string(), "SFTP");
        assert_eq!(Protocol::Https.key(), "https");
    }
}
