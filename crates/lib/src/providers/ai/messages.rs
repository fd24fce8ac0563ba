//! # Messages Wire Format
//!
//! Request and response structures for the Anthropic Messages format, as
//! accepted by the Messages API and by Bedrock's `InvokeModel` for Anthropic
//! models. Only the subset needed for a single image-plus-prompt turn is
//! modelled.

use serde::{Deserialize, Serialize};

/// A single-turn request body.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MessagesRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

impl MessagesRequest {
    /// Builds a user turn carrying one base64-encoded image followed by `prompt`.
    pub fn image_prompt(
        anthropic_version: &str,
        max_tokens: u32,
        media_type: &str,
        image_base64: String,
        prompt: &str,
    ) -> Self {
        Self {
            anthropic_version: anthropic_version.to_string(),
            max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            kind: "base64".to_string(),
                            media_type: media_type.to_string(),
                            data: image_base64,
                        },
                    },
                    ContentBlock::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        }
    }
}

/// The response body. Non-text blocks are kept as placeholders so that the
/// position of the first block is preserved.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ResponseBlock>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    /// The text of the first content block, if that block is a text block.
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(ResponseBlock::Text { text }) => Some(text),
            _ => None,
        }
    }
}

/// Picks the image media type from the object key's extension.
///
/// Unrecognised or missing extensions are sent as `image/jpeg`.
pub fn media_type_for_key(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_prompt_serializes_to_messages_shape() {
        let request =
            MessagesRequest::image_prompt("bedrock-2023-05-31", 1000, "image/png", "AAAA".into(), "hi");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": 1000,
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "AAAA"}},
                        {"type": "text", "text": "hi"}
                    ]
                }]
            })
        );
    }

    #[test]
    fn first_text_requires_leading_text_block() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [{"type": "tool_use", "id": "x"}, {"type": "text", "text": "late"}]
        }))
        .unwrap();
        assert_eq!(response.first_text(), None);

        let response: MessagesResponse =
            serde_json::from_value(json!({"content": [{"type": "text", "text": "first"}]})).unwrap();
        assert_eq!(response.first_text(), Some("first"));
    }

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(media_type_for_key("a/b/photo.PNG"), "image/png");
        assert_eq!(media_type_for_key("anim.gif"), "image/gif");
        assert_eq!(media_type_for_key("pic.webp"), "image/webp");
        assert_eq!(media_type_for_key("pic.jpeg"), "image/jpeg");
        assert_eq!(media_type_for_key("no-extension"), "image/jpeg");
    }
}
