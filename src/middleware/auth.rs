// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device identity middleware.
//!
//! The mobile client authenticates upstream (the identity provider is an
//! external collaborator); this API trusts the `X-Device-Id` header set
//! by the gateway and uses it as the user id. Requests without one are
//! rejected.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// Header carrying the authenticated device/user id.
pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// Authenticated user extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Middleware that requires a device identity on the request.
pub async fn require_auth(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = request
        .headers()
        .get(DEVICE_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_string);

    let user_id = match user_id {
        Some(id) => id,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::{middleware, routing::get, Extension, Router};
    use tower::ServiceExt; // for oneshot

    fn app() -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(user): Extension<AuthUser>| async move { user.user_id }),
            )
            .layer(middleware::from_fn(require_auth))
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_header_extracted() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(DEVICE_ID_HEADER, "device-abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_blank_header_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(DEVICE_ID_HEADER, "   ")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
