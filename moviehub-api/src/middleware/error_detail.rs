/// Internal error detail for development builds
///
/// [`crate::error::ApiError::InternalError`] answers with a generic message
/// and attaches the real cause to the response as an
/// [`InternalErrorDetail`] extension. When enabled, this layer copies that
/// cause into the body's `details.internal` field, so a developer sees
/// `"Database error: ..."` instead of only "An internal error occurred".
///
/// The layer is enabled only when `APP_ENV=development`.
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use moviehub_api::middleware::error_detail::ErrorDetailLayer;
///
/// let app: Router = Router::new()
///     .layer(ErrorDetailLayer::new(true)); // true = development mode
/// ```

use crate::error::{ErrorResponse, InternalErrorDetail};
use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    response::Response,
};
use serde_json::json;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Layer that exposes internal error detail in 500 responses
#[derive(Clone)]
pub struct ErrorDetailLayer {
    enabled: bool,
}

impl ErrorDetailLayer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl<S> Layer<S> for ErrorDetailLayer {
    type Service = ErrorDetailMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorDetailMiddleware {
            inner,
            enabled: self.enabled,
        }
    }
}

/// Service produced by [`ErrorDetailLayer`]
#[derive(Clone)]
pub struct ErrorDetailMiddleware<S> {
    inner: S,
    enabled: bool,
}

impl<S> Service<Request> for ErrorDetailMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);
        let enabled = self.enabled;

        Box::pin(async move {
            let response = future.await?;

            if !enabled || response.status() != StatusCode::INTERNAL_SERVER_ERROR {
                return Ok(response);
            }

            Ok(with_internal_detail(response))
        })
    }
}

fn with_internal_detail(response: Response) -> Response {
    let Some(InternalErrorDetail(detail)) = response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    let body = ErrorResponse {
        error: "internal_error".to_string(),
        message: "An internal error occurred".to_string(),
        details: Some(json!({ "internal": detail })),
    };

    let Ok(bytes) = serde_json::to_vec(&body) else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use axum::{response::IntoResponse, routing::get, Router};
    use tower::ServiceExt;

    async fn failing() -> impl IntoResponse {
        ApiError::InternalError("Database error: relation \"movies\" does not exist".to_string())
    }

    async fn missing() -> impl IntoResponse {
        ApiError::NotFound("Movie not found".to_string())
    }

    fn app(enabled: bool) -> Router {
        Router::new()
            .route("/fail", get(failing))
            .route("/missing", get(missing))
            .layer(ErrorDetailLayer::new(enabled))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_detail_exposed_in_development() {
        let (status, json) = call(app(true), "/fail").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "An internal error occurred");
        assert!(json["details"]["internal"]
            .as_str()
            .unwrap()
            .contains("does not exist"));
    }

    #[tokio::test]
    async fn test_detail_hidden_in_production() {
        let (status, json) = call(app(false), "/fail").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_other_errors_untouched() {
        let (status, json) = call(app(true), "/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Movie not found");
        assert!(json.get("details").is_none());
    }
}
