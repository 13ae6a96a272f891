use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

/// Predefined response for the [crate::common::TestServer] to return.
#[derive(Clone)]
pub enum TestServerResponse<T> {
    /// Fails with the given status code.
    Failure(axum::http::StatusCode),

    /// Responds with `value`, optionally carrying an `ETag` header.
    Success { value: T, etag: Option<String> },

    /// Responds with `304 Not Modified` and no body.
    NotModified,

    /// A sequence of responses, advancing one step per request. The last entry repeats
    /// once the sequence is exhausted.
    Sequence {
        sequence: Vec<TestServerResponse<T>>,
        counter: Arc<AtomicUsize>,
    },
}

impl<T> TestServerResponse<T> {
    pub fn success(value: T) -> TestServerResponse<T> {
        TestServerResponse::Success { value, etag: None }
    }

    pub fn success_with_etag(value: T, etag: impl Into<String>) -> TestServerResponse<T> {
        TestServerResponse::Success {
            value,
            etag: Some(etag.into()),
        }
    }
}

impl<T> IntoResponse for TestServerResponse<T>
where
    T: IntoResponse + Clone,
{
    fn into_response(self) -> Response {
        match self {
            TestServerResponse::Failure(code) => code.into_response(),
            TestServerResponse::NotModified => axum::http::StatusCode::NOT_MODIFIED.into_response(),
            TestServerResponse::Success { value, etag } => {
                let mut response = value.into_response();
                if let Some(etag) = etag {
                    if let Ok(value) = axum::http::HeaderValue::from_str(&etag) {
                        response.headers_mut().insert(axum::http::header::ETAG, value);
                    }
                }
                response
            }
            TestServerResponse::Sequence { sequence, counter } => {
                let index = counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

                if index >= sequence.len() {
                    return sequence
                        .last()
                        .cloned()
                        .unwrap_or(TestServerResponse::Failure(axum::http::StatusCode::NOT_FOUND))
                        .into_response();
                }

                sequence[index].clone().into_response()
            }
        }
    }
}
