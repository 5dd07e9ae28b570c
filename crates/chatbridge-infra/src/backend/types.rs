//! Wire types for the conversation proxy API.
//!
//! These map between the generic `AskRequest`/`AskResponse` and the JSON the
//! proxy speaks. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use chatbridge_types::backend::{AskRequest, AskResponse, BackendError, ProviderChain};

/// Request body POSTed to the proxy.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_signature: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
}

impl<'a> From<&'a AskRequest> for ProxyRequest<'a> {
    fn from(request: &'a AskRequest) -> Self {
        let continuation = request.continuation.as_ref();
        let chain = continuation.and_then(|c| c.chain.as_ref());
        let non_empty = |s: &'a String| Some(s.as_str()).filter(|s| !s.is_empty());

        Self {
            message: &request.question,
            conversation_id: continuation.and_then(|c| non_empty(&c.conversation_id)),
            parent_message_id: continuation.and_then(|c| non_empty(&c.parent_message_id)),
            client_id: chain.map(|c| c.client_id.as_str()),
            conversation_signature: chain.map(|c| c.conversation_signature.as_str()),
            invocation_id: chain.map(|c| c.invocation_id),
            system_message: request.system_prompt.as_deref(),
            model: request.model.as_deref(),
        }
    }
}

/// Response body returned by the proxy.
///
/// The chaining fields are only sent by providers that need them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub invocation_id: Option<u32>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub conversation_signature: Option<String>,
}

impl ProxyResponse {
    /// Classify into a plain or chained answer.
    ///
    /// A response is chained only when the invocation counter, client id and
    /// signature are all present and non-empty.
    pub fn into_ask_response(self) -> Result<AskResponse, BackendError> {
        if self.response.is_empty() {
            return Err(BackendError::InvalidResponse(
                "proxy returned an empty response".to_string(),
            ));
        }

        let chain = ProviderChain::from_parts(
            self.invocation_id,
            self.client_id,
            self.conversation_signature,
        );

        Ok(match chain {
            Some(chain) => AskResponse::Chained {
                text: self.response,
                conversation_id: self.conversation_id,
                message_id: self.message_id,
                chain,
            },
            None => AskResponse::Plain {
                text: self.response,
                conversation_id: self.conversation_id,
                message_id: self.message_id,
            },
        })
    }
}
