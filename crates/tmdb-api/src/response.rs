//! `Response` abstraction over typed HTTP responses.

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use super::types::TmdbErrorResponse;

/// An abstraction of a typed HTTP response wrapper.
pub trait Response {
    /// Returns the status text (e.g. "200 OK").
    fn status(&self) -> String;

    /// Returns the status code.
    fn status_code(&self) -> u16;
}

/// Typed response of a single API operation.
///
/// A non-2xx status is not an error at this level; the decoded TMDB error
/// body, if any, is available through [`ApiResponse::error`].
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct ApiResponse<T> {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    data: Option<T>,
    error: Option<TmdbErrorResponse>,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Reads and decodes a `reqwest` response.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be read, or if a 2xx body is
    /// not valid JSON for `T`.
    pub(crate) async fn from_response(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .context("failed to read response body")?;
        Self::from_parts(status, headers, body)
    }

    /// Decodes a response from its already-read parts.
    fn from_parts(status: StatusCode, headers: HeaderMap, body: String) -> Result<Self> {
        let (data, error) = if status.is_success() {
            let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
            let parsed = raw_result.context("failed to decode JSON response")?;
            (Some(parsed), None)
        } else {
            (None, serde_json::from_str::<TmdbErrorResponse>(&body).ok())
        };

        Ok(Self {
            status,
            headers,
            body,
            data,
            error,
        })
    }
}

impl<T> ApiResponse<T> {
    /// Returns the decoded success body (2xx only).
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Returns the decoded TMDB error body (non-2xx only).
    pub const fn error(&self) -> Option<&TmdbErrorResponse> {
        self.error.as_ref()
    }

    /// Returns the response headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Converts into the success body.
    ///
    /// # Errors
    ///
    /// Returns an error describing the HTTP status and TMDB error message
    /// if the response was not successful.
    pub fn into_result(self) -> Result<T> {
        if let Some(data) = self.data {
            return Ok(data);
        }
        if let Some(error) = self.error {
            bail!(
                "TMDB API error (HTTP {}): code={}, message={}",
                self.status,
                error.status_code,
                error.status_message,
            );
        }
        bail!("TMDB API error (HTTP {}): {}", self.status, self.body);
    }
}

impl<T> Response for ApiResponse<T> {
    fn status(&self) -> String {
        self.status.to_string()
    }

    fn status_code(&self) -> u16 {
        self.status.as_u16()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::types::TmdbGenre;

    #[test]
    fn test_success_response_exposes_data() {
        // Arrange
        let body = String::from(r#"{"id":16,"name":"Animation"}"#);

        // Act
        let response: ApiResponse<TmdbGenre> =
            ApiResponse::from_parts(StatusCode::OK, HeaderMap::new(), body).unwrap();

        // Assert
        assert_eq!(response.status(), "200 OK");
        assert_eq!(response.status_code(), 200);
        assert!(response.error().is_none());
        assert_eq!(
            response.into_result().unwrap(),
            TmdbGenre {
                id: 16,
                name: String::from("Animation"),
            }
        );
    }

    #[test]
    fn test_error_response_decodes_tmdb_error() {
        // Arrange
        let body = String::from(
            r#"{"status_code":34,"status_message":"The resource you requested could not be found.","success":false}"#,
        );

        // Act
        let response: ApiResponse<TmdbGenre> =
            ApiResponse::from_parts(StatusCode::NOT_FOUND, HeaderMap::new(), body).unwrap();

        // Assert
        assert_eq!(response.status(), "404 Not Found");
        assert_eq!(response.status_code(), 404);
        assert!(response.data().is_none());
        assert_eq!(response.error().unwrap().status_code, 34);
        let err = response.into_result().unwrap_err().to_string();
        assert!(err.contains("HTTP 404 Not Found"));
        assert!(err.contains("code=34"));
    }

    #[test]
    fn test_error_response_with_plain_body() {
        // Arrange
        let body = String::from("upstream timeout");

        // Act
        let response: ApiResponse<TmdbGenre> =
            ApiResponse::from_parts(StatusCode::BAD_GATEWAY, HeaderMap::new(), body).unwrap();

        // Assert
        assert!(response.error().is_none());
        assert_eq!(response.body(), "upstream timeout");
        let err = response.into_result().unwrap_err().to_string();
        assert_eq!(err, "TMDB API error (HTTP 502 Bad Gateway): upstream timeout");
    }

    #[test]
    fn test_invalid_success_body_is_an_error() {
        // Arrange
        let body = String::from("<html>maintenance</html>");

        // Act
        let result: Result<ApiResponse<TmdbGenre>> =
            ApiResponse::from_parts(StatusCode::OK, HeaderMap::new(), body);

        // Assert
        assert!(result.is_err());
    }
}
