use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AskError;

/// Anything that can turn a question into a markdown answer.
///
/// [`AskClient`] is the production implementation; the dispatcher is generic
/// over this so it can be driven without a network.
pub trait AnswerSource: Clone + Send + Sync + 'static {
    fn ask(&self, question: &str) -> impl Future<Output = Result<String, AskError>> + Send;
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

#[derive(Clone)]
pub struct AskClient {
    client: Client,
    endpoint: String,
}

impl AskClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AskError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn ask(&self, question: &str) -> Result<String, AskError> {
        debug!(endpoint = %self.endpoint, "posting question");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AskRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status(status));
        }

        let body = response.text().await?;
        let ask_response: AskResponse = serde_json::from_str(&body)?;
        Ok(ask_response.answer)
    }
}

impl AnswerSource for AskClient {
    fn ask(&self, question: &str) -> impl Future<Output = Result<String, AskError>> + Send {
        AskClient::ask(self, question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn client_for(server: &MockServer) -> AskClient {
        AskClient::new(&format!("{}/api/ask", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_ask_returns_answer_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ask"))
            .and(body_json(json!({ "question": "Two Sum" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "# Hello" })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = client_for(&server).await.ask("Two Sum").await.unwrap();
        assert_eq!(answer, "# Hello");
    }

    #[tokio::test]
    async fn test_ask_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).await.ask("heap").await.unwrap_err();
        match err {
            AskError::Status(status) => assert_eq!(status.as_u16(), 503),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ask_missing_answer_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "nope" })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.ask("trie").await.unwrap_err();
        assert!(matches!(err, AskError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_ask_body_not_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>down</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.ask("graph").await.unwrap_err();
        assert!(matches!(err, AskError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_ask_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "answer": "late" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = AskClient::new(
            &format!("{}/api/ask", server.uri()),
            Duration::from_millis(100),
        )
        .unwrap();
        let err = client.ask("slow").await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_ask_unreachable_host() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = AskClient::new("http://127.0.0.1:9/api/ask", Duration::from_secs(2)).unwrap();
        let err = client.ask("bfs").await.unwrap_err();
        assert!(matches!(err, AskError::Transport(_)));
    }

    #[test]
    fn test_endpoint_is_trimmed() {
        let client = AskClient::new(" http://localhost:5000/api/ask ", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:5000/api/ask");
    }
}
