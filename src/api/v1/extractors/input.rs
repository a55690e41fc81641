/*
 * Responsibility
 * - Json / Path / Query を包み、失敗時は AppError ({"error": ...}) に変換する
 * - axum 標準の plain-text rejection をクライアントに返さない
 */
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path parameters.
#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{self, StatusCode, header},
        response::IntoResponse,
    };
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        seats: i32,
    }

    fn json_request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn rejection_body(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn valid_json_is_extracted() {
        let req = json_request(Some("application/json"), r#"{"seats":3}"#);
        let ApiJson(payload) = ApiJson::<Payload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.seats, 3);
    }

    #[tokio::test]
    async fn json_failures_render_as_error_objects() {
        let cases = [
            (None, r#"{"seats":3}"#, "expected an application/json body"),
            (Some("application/json"), r#"{"seats":"#, "malformed JSON body"),
            (Some("application/json"), r#"{"seats":"three"}"#, "invalid JSON body"),
        ];

        for (content_type, body, message) in cases {
            let err = ApiJson::<Payload>::from_request(json_request(content_type, body), &())
                .await
                .err()
                .unwrap();
            let (status, body) = rejection_body(err).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, serde_json::json!({ "error": message }));
        }
    }

    #[tokio::test]
    async fn bad_query_renders_as_error_object() {
        let (mut parts, _) = http::Request::builder()
            .uri("/?seats=lots")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let err = ApiQuery::<Payload>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        let (status, body) = rejection_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "invalid query string"}));
    }
}
