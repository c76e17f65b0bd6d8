//! Request editors applied to every outgoing request.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};

/// A hook given the chance to mutate an outgoing request before dispatch.
///
/// Returning an error aborts the request before it is sent.
pub type RequestEditorFn = Arc<dyn Fn(&mut Request) -> Result<()> + Send + Sync>;

/// Wraps a closure into a [`RequestEditorFn`].
pub fn request_editor<F>(f: F) -> RequestEditorFn
where
    F: Fn(&mut Request) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Returns an editor that sets `Authorization: Bearer <token>`.
///
/// Any existing `Authorization` header is overwritten.
pub fn bearer_token_editor(token: impl Into<String>) -> RequestEditorFn {
    let token = token.into();
    request_editor(move |request: &mut Request| {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .context("bearer token is not a valid header value")?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    })
}

/// Applies `editors` to `request` in order.
///
/// # Errors
///
/// Returns the first editor failure; later editors are not run.
pub fn apply_request_editors(editors: &[RequestEditorFn], request: &mut Request) -> Result<()> {
    for (index, editor) in editors.iter().enumerate() {
        editor(request).with_context(|| format!("request editor #{index} failed"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use anyhow::bail;
    use reqwest::Method;
    use reqwest::header::HeaderName;

    use super::*;

    fn new_request() -> Request {
        Request::new(
            Method::GET,
            "https://api.themoviedb.org/3/search/movie".parse().unwrap(),
        )
    }

    #[test]
    fn test_bearer_token_editor_sets_header() {
        // Arrange
        let editor = bearer_token_editor("eyJhbGciOiJIUzI1NiJ9.token");
        let mut request = new_request();

        // Act
        editor(&mut request).unwrap();

        // Assert
        assert_eq!(
            request.headers()[AUTHORIZATION],
            "Bearer eyJhbGciOiJIUzI1NiJ9.token"
        );
        assert!(request.headers()[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_bearer_token_editor_overwrites_existing_header() {
        // Arrange
        let editor = bearer_token_editor("new-token");
        let mut request = new_request();
        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));

        // Act
        editor(&mut request).unwrap();

        // Assert
        let values: Vec<_> = request.headers().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values, vec!["Bearer new-token"]);
    }

    #[test]
    fn test_bearer_token_editor_rejects_control_characters() {
        // Arrange
        let editor = bearer_token_editor("bad\ntoken");
        let mut request = new_request();

        // Act
        let result = editor(&mut request);

        // Assert
        assert!(result.is_err());
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_apply_request_editors_runs_in_insertion_order() {
        // Arrange
        let trace = HeaderName::from_static("x-trace");
        let first = {
            let trace = trace.clone();
            request_editor(move |req: &mut Request| {
                req.headers_mut()
                    .append(trace.clone(), HeaderValue::from_static("first"));
                Ok(())
            })
        };
        let second = {
            let trace = trace.clone();
            request_editor(move |req: &mut Request| {
                req.headers_mut()
                    .append(trace.clone(), HeaderValue::from_static("second"));
                Ok(())
            })
        };
        let mut request = new_request();

        // Act
        apply_request_editors(&[first, second], &mut request).unwrap();

        // Assert
        let values: Vec<_> = request.headers().get_all(&trace).iter().collect();
        assert_eq!(values, vec!["first", "second"]);
    }

    #[test]
    fn test_apply_request_editors_stops_at_first_failure() {
        // Arrange
        let failing = request_editor(|_: &mut Request| bail!("signing key unavailable"));
        let never_run = request_editor(|req: &mut Request| {
            req.headers_mut()
                .insert("x-after", HeaderValue::from_static("1"));
            Ok(())
        });
        let mut request = new_request();

        // Act
        let result = apply_request_editors(&[failing, never_run], &mut request);

        // Assert
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "request editor #0 failed");
        assert!(format!("{err:#}").contains("signing key unavailable"));
        assert!(request.headers().get("x-after").is_none());
    }
}
