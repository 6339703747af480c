use futures::StreamExt;
use thiserror::Error;

/// Failure while reading a response body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    TooLarge(usize),
    #[error("Response is not valid UTF-8")]
    NotUtf8,
}

/// Read a response body as text, refusing anything over `limit` bytes.
///
/// A declared `Content-Length` over the limit is rejected before reading;
/// otherwise the stream is cut off as soon as it crosses the limit.
pub async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, BodyError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(BodyError::TooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(BodyError::TooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| BodyError::NotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn fetch(server: &MockServer) -> reqwest::Response {
        reqwest::Client::new().get(server.uri()).send().await.unwrap()
    }

    #[tokio::test]
    async fn test_reads_body_within_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let text = read_limited_text(fetch(&server).await, 5).await.unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_rejects_oversized_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello!"))
            .mount(&server)
            .await;

        let result = read_limited_text(fetch(&server).await, 5).await;
        assert!(matches!(result, Err(BodyError::TooLarge(5))));
    }

    #[tokio::test]
    async fn test_rejects_invalid_utf8() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe]))
            .mount(&server)
            .await;

        let result = read_limited_text(fetch(&server).await, 64).await;
        assert!(matches!(result, Err(BodyError::NotUtf8)));
    }
}
