//! Security sources for the TMDB `Sec0` API-key scheme.
#![allow(clippy::future_not_send)]

use anyhow::{Context, Result};
use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};

/// Security value for the `Sec0` scheme.
#[derive(Clone, PartialEq, Eq)]
pub struct Sec0 {
    /// API key sent verbatim in the `Authorization` header.
    pub api_key: String,
}

impl Sec0 {
    /// Creates a new security value.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for Sec0 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sec0").field("api_key", &"<redacted>").finish()
    }
}

/// Provider of security values (tokens, passwords, etc.).
///
/// Queried once per outgoing request with the name of the operation
/// being invoked. Implementations may return a static key or fetch a
/// rotating one.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(SecuritySource: Send)]
pub trait LocalSecuritySource {
    /// Provides the `Sec0` security value for `operation_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential can be produced. The request is
    /// then aborted before it is sent.
    async fn sec0(&self, operation_name: &str) -> Result<Sec0>;
}

/// Security source returning a fixed API key.
#[derive(Clone)]
pub struct StaticApiKey {
    api_key: String,
}

impl StaticApiKey {
    /// Creates a source that always yields `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for StaticApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticApiKey")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl SecuritySource for StaticApiKey {
    async fn sec0(&self, _operation_name: &str) -> Result<Sec0> {
        Ok(Sec0::new(self.api_key.clone()))
    }
}

/// Queries `source` and sets `Authorization` to the raw API key.
///
/// # Errors
///
/// Returns an error wrapped with the scheme name if the source fails or
/// the key is not a valid header value.
pub(crate) async fn apply_sec0<S>(
    source: &S,
    operation_name: &str,
    request: &mut Request,
) -> Result<()>
where
    S: SecuritySource + Sync,
{
    let sec = match SecuritySource::sec0(source, operation_name).await {
        Ok(sec) => sec,
        Err(err) => {
            tracing::warn!(operation = operation_name, "security source \"Sec0\" failed");
            return Err(err.context("security source \"Sec0\""));
        }
    };

    let mut value =
        HeaderValue::from_str(&sec.api_key).context("security source \"Sec0\": invalid API key")?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use anyhow::bail;
    use reqwest::Method;

    use super::*;

    struct FailingSource;

    impl SecuritySource for FailingSource {
        async fn sec0(&self, operation_name: &str) -> Result<Sec0> {
            bail!("no credential for {operation_name}")
        }
    }

    fn new_request() -> Request {
        Request::new(
            Method::GET,
            "https://api.themoviedb.org/3/movie/550".parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_static_api_key_returns_key() {
        // Arrange
        let source = StaticApiKey::new("abc123");

        // Act
        let sec = SecuritySource::sec0(&source, "movie-details").await.unwrap();

        // Assert
        assert_eq!(sec, Sec0::new("abc123"));
    }

    #[tokio::test]
    async fn test_apply_sec0_sets_raw_header() {
        // Arrange
        let source = StaticApiKey::new("abc123");
        let mut request = new_request();

        // Act
        apply_sec0(&source, "movie-details", &mut request)
            .await
            .unwrap();

        // Assert
        assert_eq!(request.headers()[AUTHORIZATION], "abc123");
    }

    #[tokio::test]
    async fn test_apply_sec0_failure_names_scheme() {
        // Arrange
        let mut request = new_request();

        // Act
        let result = apply_sec0(&FailingSource, "movie-details", &mut request).await;

        // Assert
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Sec0"));
        assert!(format!("{err:#}").contains("no credential for movie-details"));
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        // Arrange
        let source = StaticApiKey::new("super-secret");

        // Act
        let rendered = format!("{source:?} {:?}", Sec0::new("super-secret"));

        // Assert
        assert!(!rendered.contains("super-secret"));
    }
}
