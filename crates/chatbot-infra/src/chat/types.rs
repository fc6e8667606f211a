//! Chat service wire types.
//!
//! These mirror the JSON the chat endpoint returns. They are NOT the domain
//! types from chatbot-types; `HttpChatClient` converts between the two.

use serde::Deserialize;

/// Top-level response body.
///
/// ```json
/// {"success":1,"errorMessage":"","message":{"chatBotName":"Cyber Ty",
///  "chatBotID":63906,"message":"Hello!","emotion":"normal"},"data":[]}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ChatApiResponse {
    pub success: i64,
    #[serde(rename = "errorMessage", default)]
    pub error_message: String,
    /// Shape varies on failed calls (absent, `""` or `[]`), so it is only
    /// decoded into `ChatApiMessage` once `success` is 1.
    #[serde(default)]
    pub message: serde_json::Value,
}

/// The bot's answer inside a successful response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatApiMessage {
    #[serde(rename = "chatBotName")]
    pub chat_bot_name: String,
    #[serde(rename = "chatBotID")]
    pub chat_bot_id: i64,
    pub message: String,
    #[serde(default)]
    pub emotion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_success_body() {
        let body = r#"{"success":1,"errorMessage":"","message":{"chatBotName":"Cyber Ty","chatBotID":63906,"message":"You're sending the same message over and over.","emotion":"normal"},"data":[]}"#;
        let resp: ChatApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.success, 1);
        let message: ChatApiMessage = serde_json::from_value(resp.message).unwrap();
        assert_eq!(message.chat_bot_name, "Cyber Ty");
        assert_eq!(message.chat_bot_id, 63906);
        assert_eq!(message.emotion, "normal");
    }

    #[test]
    fn test_deserialize_failure_without_message() {
        let body = r#"{"success":0,"errorMessage":"Invalid API key"}"#;
        let resp: ChatApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.success, 0);
        assert_eq!(resp.error_message, "Invalid API key");
        assert!(resp.message.is_null());
    }

    #[test]
    fn test_deserialize_failure_with_empty_message() {
        let body = r#"{"success":0,"errorMessage":"","message":[]}"#;
        let resp: ChatApiResponse = serde_json::from_str(body).unwrap();
        assert!(resp.error_message.is_empty());
        assert!(serde_json::from_value::<ChatApiMessage>(resp.message).is_err());
    }
}
