//! HttpChatClient -- concrete [`ChatClient`] for the hosted chat bot service.
//!
//! Each utterance is one `GET` request carrying the API key, bot id, message
//! text and a per-conversation external id as query parameters. The service
//! answers with a JSON envelope whose `success` flag decides between a bot
//! reply and an error message.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged.
//! Because it travels in the query string, transport errors are stripped of
//! their URL before they are turned into `ChatClientError`s.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use chatbot_core::chat::client::ChatClient;
use chatbot_types::chat::{BotReply, ConversationId};
use chatbot_types::config::ApiConfig;
use chatbot_types::error::ChatClientError;

use super::types::{ChatApiMessage, ChatApiResponse};

/// Chat service client over HTTP.
pub struct HttpChatClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    bot_id: i64,
    external_id_prefix: String,
}

// No Debug derive: keeps the client (and its key) out of debug output.

impl HttpChatClient {
    /// Build a client from the `[api]` config section.
    ///
    /// Without an API key the client still constructs; every send then fails
    /// with `ChatClientError::Rejected` and no request is made.
    pub fn new(config: &ApiConfig, api_key: Option<SecretString>) -> Result<Self, ChatClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatClientError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            bot_id: config.bot_id,
            external_id_prefix: config.external_id_prefix.clone(),
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// External id the service uses to keep per-conversation context.
    fn external_id(&self, conversation_id: ConversationId) -> String {
        format!("{}-{}", self.external_id_prefix, conversation_id)
    }

    fn decode(body: &str) -> Result<BotReply, ChatClientError> {
        let envelope: ChatApiResponse = serde_json::from_str(body)
            .map_err(|e| ChatClientError::Malformed(format!("failed to parse response: {e}")))?;

        if envelope.success != 1 {
            return Err(if envelope.error_message.trim().is_empty() {
                ChatClientError::Unknown
            } else {
                ChatClientError::Rejected(envelope.error_message)
            });
        }

        let message: ChatApiMessage = serde_json::from_value(envelope.message)
            .map_err(|e| ChatClientError::Malformed(format!("missing bot message: {e}")))?;

        Ok(BotReply {
            bot_name: message.chat_bot_name,
            bot_id: message.chat_bot_id,
            text: message.message,
            emotion: message.emotion,
        })
    }
}

impl ChatClient for HttpChatClient {
    async fn send(
        &self,
        text: &str,
        conversation_id: ConversationId,
    ) -> Result<BotReply, ChatClientError> {
        let Some(api_key) = &self.api_key else {
            return Err(ChatClientError::Rejected(
                "no API key configured (set CHATBOT_API_KEY or api.api_key)".to_string(),
            ));
        };

        let bot_id = self.bot_id.to_string();
        let external_id = self.external_id(conversation_id);

        debug!(%conversation_id, bot_id = self.bot_id, "Sending message to chat service");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("apiKey", api_key.expose_secret()),
                ("chatBotID", bot_id.as_str()),
                ("message", text),
                ("externalID", external_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ChatClientError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ChatClientError::Transport(format!("HTTP {status}: {error_body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatClientError::Transport(e.without_url().to_string()))?;

        Self::decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> HttpChatClient {
        HttpChatClient::new(&ApiConfig::default(), Some(SecretString::from("test-key")))
            .unwrap()
            .with_base_url(format!("{}/api/chat/", server.uri()))
    }

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "success": 1,
            "errorMessage": "",
            "message": {
                "chatBotName": "Cyber Ty",
                "chatBotID": 63906,
                "message": text,
                "emotion": "normal"
            },
            "data": []
        })
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chat/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Hello human")))
            .expect(1)
            .mount(&server)
            .await;

        let reply = test_client(&server)
            .send("hi", ConversationId(1))
            .await
            .unwrap();

        assert_eq!(reply.text, "Hello human");
        assert_eq!(reply.bot_name, "Cyber Ty");
        assert_eq!(reply.bot_id, 63906);
        assert_eq!(reply.emotion, "normal");
    }

    #[tokio::test]
    async fn test_send_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chat/"))
            .and(query_param("apiKey", "test-key"))
            .and(query_param("chatBotID", "63906"))
            .and(query_param("message", "how are you?"))
            .and(query_param("externalID", "chatbot-4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("fine")))
            .expect(1)
            .mount(&server)
            .await;

        let reply = test_client(&server)
            .send("how are you?", ConversationId(4))
            .await
            .unwrap();
        assert_eq!(reply.text, "fine");
    }

    #[tokio::test]
    async fn test_send_rejected_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": 0,
                "errorMessage": "Invalid API key",
                "message": []
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .send("hi", ConversationId(1))
            .await
            .unwrap_err();
        assert_eq!(err, ChatClientError::Rejected("Invalid API key".to_string()));
    }

    #[tokio::test]
    async fn test_send_rejected_without_message_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": 0,
                "errorMessage": ""
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .send("hi", ConversationId(1))
            .await
            .unwrap_err();
        assert!(err.is_unknown());
    }

    #[tokio::test]
    async fn test_send_http_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .send("hi", ConversationId(1))
            .await
            .unwrap_err();
        match err {
            ChatClientError::Transport(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("maintenance"));
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .send("hi", ConversationId(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatClientError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_send_success_without_message_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": 1,
                "errorMessage": ""
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .send("hi", ConversationId(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatClientError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_send_connection_refused_hides_api_key() {
        // Nothing listens on port 9 of localhost.
        let client = HttpChatClient::new(&ApiConfig::default(), Some(SecretString::from("sekrit")))
            .unwrap()
            .with_base_url("http://127.0.0.1:9/api/chat/".to_string());

        let err = client.send("hi", ConversationId(1)).await.unwrap_err();
        match err {
            ChatClientError::Transport(msg) => assert!(!msg.contains("sekrit")),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_without_api_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let client = HttpChatClient::new(&ApiConfig::default(), None)
            .unwrap()
            .with_base_url(server.uri());

        let err = client.send("hi", ConversationId(1)).await.unwrap_err();
        assert!(matches!(err, ChatClientError::Rejected(_)));
    }

    #[test]
    fn test_external_id_uses_prefix() {
        let config = ApiConfig {
            external_id_prefix: "ios".to_string(),
            ..ApiConfig::default()
        };
        let client = HttpChatClient::new(&config, None).unwrap();
        assert_eq!(client.external_id(ConversationId(12)), "ios-12");
    }
}
