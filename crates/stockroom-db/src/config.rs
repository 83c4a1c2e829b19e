//! Database endpoint resolution from the environment.
//!
//! The backing store is selected by a single connection-string URI, read
//! from the `DATABASE_URL` environment variable. When the variable is
//! unset the store defaults to a file-backed database named `stock.db` in
//! the working directory. Loading variables from a dotenv file is the
//! caller's concern, not this crate's.

use std::env::VarError;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable holding the database connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Connection string used when [`DATABASE_URL_VAR`] is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///./stock.db";

/// A parsed database endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// A file-backed database at the given path.
    File(PathBuf),
    /// A process-private in-memory database.
    Memory,
}

/// Errors that can occur when resolving the database endpoint.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The URL names a scheme this crate cannot serve. The storage layer is
    /// SQLite-only; a URL for another engine fails here, at configuration
    /// time, instead of being misread as a file path.
    #[error("unsupported database scheme '{0}': only sqlite endpoints are supported")]
    UnsupportedScheme(String),

    /// The string is not a connection URL in a form this crate understands.
    #[error("invalid database url '{0}'")]
    InvalidUrl(String),

    /// The environment variable is set but holds non-unicode bytes.
    #[error("DATABASE_URL is set but is not valid unicode")]
    NotUnicode,
}

impl DatabaseUrl {
    /// Parses a `sqlite://` connection string.
    ///
    /// Accepted forms, following SQLAlchemy's `sqlite://` URL conventions:
    ///
    /// - `sqlite://` or `sqlite:///:memory:` for the in-memory database
    /// - `sqlite:///relative/path.db` for a file relative to the working
    ///   directory (so the default `sqlite:///./stock.db` means
    ///   `./stock.db`)
    /// - `sqlite:////absolute/path.db` for an absolute file path
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedScheme`] for any non-sqlite scheme
    /// and [`ConfigError::InvalidUrl`] for scheme-less strings or URLs with
    /// a host component, which has no meaning for an embedded database.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let rest = match url.strip_prefix("sqlite://") {
            Some(rest) => rest,
            None => {
                return Err(match url.split_once("://") {
                    Some((scheme, _)) => ConfigError::UnsupportedScheme(scheme.to_string()),
                    None => ConfigError::InvalidUrl(url.to_string()),
                });
            }
        };

        if rest.is_empty() {
            return Ok(Self::Memory);
        }

        let path = match rest.strip_prefix('/') {
            Some(path) => path,
            // sqlite://something-without-a-slash is a host component.
            None => return Err(ConfigError::InvalidUrl(url.to_string())),
        };

        if path.is_empty() || path == ":memory:" {
            return Ok(Self::Memory);
        }

        Ok(Self::File(PathBuf::from(path)))
    }
}

/// Resolves the database endpoint from [`DATABASE_URL_VAR`], falling back
/// to [`DEFAULT_DATABASE_URL`] when the variable is unset.
///
/// # Errors
///
/// Returns `ConfigError` if the variable is set to something that is not a
/// supported sqlite URL, or is not valid unicode.
pub fn database_url_from_env() -> Result<DatabaseUrl, ConfigError> {
    match std::env::var(DATABASE_URL_VAR) {
        Ok(url) => DatabaseUrl::parse(&url),
        Err(VarError::NotPresent) => {
            tracing::debug!(
                default = DEFAULT_DATABASE_URL,
                "DATABASE_URL unset, using default endpoint"
            );
            DatabaseUrl::parse(DEFAULT_DATABASE_URL)
        }
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_relative_file_url() {
        let url = DatabaseUrl::parse("sqlite:///./stock.db").expect("should parse");
        assert_eq!(url, DatabaseUrl::File(PathBuf::from("./stock.db")));
    }

    #[test]
    fn parse_absolute_file_url() {
        let url = DatabaseUrl::parse("sqlite:////var/lib/stockroom/stock.db").expect("should parse");
        assert_eq!(
            url,
            DatabaseUrl::File(PathBuf::from("/var/lib/stockroom/stock.db"))
        );
    }

    #[test]
    fn parse_memory_urls() {
        assert_eq!(DatabaseUrl::parse("sqlite://").unwrap(), DatabaseUrl::Memory);
        assert_eq!(DatabaseUrl::parse("sqlite:///").unwrap(), DatabaseUrl::Memory);
        assert_eq!(
            DatabaseUrl::parse("sqlite:///:memory:").unwrap(),
            DatabaseUrl::Memory
        );
    }

    #[test]
    fn parse_default_url_is_working_directory_file() {
        let url = DatabaseUrl::parse(DEFAULT_DATABASE_URL).expect("default must parse");
        assert_eq!(url, DatabaseUrl::File(PathBuf::from("./stock.db")));
    }

    #[test]
    fn parse_rejects_foreign_scheme() {
        let err = DatabaseUrl::parse("postgresql://localhost/stock").unwrap_err();
        match err {
            ConfigError::UnsupportedScheme(scheme) => assert_eq!(scheme, "postgresql"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_scheme_less_string() {
        let err = DatabaseUrl::parse("./stock.db").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn parse_rejects_host_component() {
        let err = DatabaseUrl::parse("sqlite://dbhost/stock.db").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }
}
