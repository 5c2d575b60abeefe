//! Signup service client
//!
//! Thin client for the downstream signup endpoint: posts the connected
//! wallet token, receives a session token. The orchestrator never calls
//! this itself; it belongs to the consumer the address is handed to.

use serde::{Deserialize, Serialize};

use crate::config::SignupConfig;
use crate::error::SignupError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest<'a> {
    wallet_token: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

pub struct SignupClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SignupClient {
    pub fn new(config: &SignupConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Register the connected wallet and obtain a session token
    pub async fn signup(&self, wallet_token: &str) -> Result<SignupResponse, SignupError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&SignupRequest { wallet_token })
            .send()
            .await?
            .error_for_status()?;

        let body: SignupResponse = resp.json().await?;
        if !body.success {
            return Err(SignupError::Rejected(body.message));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_payload_shape() {
        let json = serde_json::to_string(&SignupRequest {
            wallet_token: "0xfeed",
        })
        .unwrap();
        assert_eq!(json, r#"{"walletToken":"0xfeed"}"#);
    }

    #[test]
    fn test_response_parse() {
        let body = r#"{"success":true,"message":"ok","token":"jwt-123"}"#;
        let resp: SignupResponse = serde_json::from_str(body).unwrap();
        assert!(resp.success);
        assert_eq!(resp.token, "jwt-123");
    }
}
