/// Request extractors that reject with [`ApiError`]
///
/// axum's own `Json`, `Path` and `Query` reject with plain-text bodies.
/// These wrappers run the same extraction and turn the rejection into the
/// JSON error shape every other failure uses.

use crate::error::ApiError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
};
use serde::de::DeserializeOwned;

/// JSON body; malformed or mistyped bodies are a 400
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters; an unparseable id is a 400
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string; an unparseable value is a 400
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// JSON body that may be left out entirely
///
/// An empty (or whitespace-only) body yields `None`. Anything else must
/// parse as `T`, so a present-but-wrong body is never mistaken for an
/// absent one.
#[derive(Debug)]
pub struct OptionalJson<T>(pub Option<T>);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        serde_json::from_slice(&bytes)
            .map(|value| Self(Some(value)))
            .map_err(|err| ApiError::BadRequest(format!("Invalid JSON body: {}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest},
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        count: Option<i32>,
    }

    fn json_request(body: &'static str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let result = ApiJson::<Payload>::from_request(json_request("{\"count\": "), &()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_mistyped_json_field_is_bad_request() {
        let result = ApiJson::<Payload>::from_request(json_request("{\"count\": \"5\"}"), &()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("{\"count\": 5}"))
            .unwrap();

        let result = ApiJson::<Payload>::from_request(req, &()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_query_rejection_is_bad_request() {
        #[derive(Debug, Deserialize)]
        struct Limit {
            #[allow(dead_code)]
            limit: Option<i64>,
        }

        let req = HttpRequest::builder().uri("/?limit=ten").body(Body::empty()).unwrap();
        let (mut parts, _) = req.into_parts();

        let result = ApiQuery::<Limit>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_optional_json_empty_body_is_none() {
        let OptionalJson(value) = OptionalJson::<Payload>::from_request(json_request(""), &())
            .await
            .unwrap();
        assert!(value.is_none());

        let OptionalJson(value) = OptionalJson::<Payload>::from_request(json_request("  \n"), &())
            .await
            .unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_optional_json_parses_present_body() {
        let OptionalJson(value) =
            OptionalJson::<Payload>::from_request(json_request("{\"count\": 3}"), &())
                .await
                .unwrap();
        assert_eq!(value.and_then(|p| p.count), Some(3));
    }

    #[tokio::test]
    async fn test_optional_json_rejects_wrong_types() {
        let result =
            OptionalJson::<Payload>::from_request(json_request("{\"count\": \"50\"}"), &()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        let result = OptionalJson::<Payload>::from_request(json_request("not json"), &()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
