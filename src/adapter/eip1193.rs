//! Shared EIP-1193 account request path
//!
//! MetaMask, Trust and Coinbase all funnel through `eth_requestAccounts`;
//! this module holds the one request/normalization pipeline they share.

use serde_json::Value;

use super::Address;
use crate::error::{ConnectError, Result};
use crate::provider::{EvmProvider, ProviderError, CODE_REQUEST_PENDING, CODE_USER_REJECTED};

/// Invoke `eth_requestAccounts` and normalize the outcome to one address
pub(crate) async fn request_accounts(wallet: &str, provider: &dyn EvmProvider) -> Result<Address> {
    let value = provider
        .request("eth_requestAccounts", Vec::new())
        .await
        .map_err(|e| normalize(wallet, e))?;
    first_account(wallet, &value)
}

/// Map provider-specific failure signals onto the error taxonomy
pub(crate) fn normalize(wallet: &str, err: ProviderError) -> ConnectError {
    match err.code {
        Some(CODE_USER_REJECTED) => ConnectError::UserRejected,
        Some(CODE_REQUEST_PENDING) => ConnectError::AlreadyPending,
        _ => ConnectError::Provider {
            wallet: wallet.to_string(),
            message: err.message,
        },
    }
}

/// Exactly one address: the first entry of the returned account list, in
/// provider order. An empty (or malformed) list is a failure, never success.
pub(crate) fn first_account(wallet: &str, value: &Value) -> Result<Address> {
    match value
        .as_array()
        .and_then(|accounts| accounts.first())
        .and_then(Value::as_str)
    {
        Some(addr) if !addr.is_empty() => Ok(Address::new(addr)),
        _ => Err(ConnectError::NoAccountReturned {
            wallet: wallet.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_rejection_codes() {
        let err = normalize("MetaMask", ProviderError::with_code(4001, "User rejected"));
        assert_eq!(err, ConnectError::UserRejected);

        let err = normalize("MetaMask", ProviderError::with_code(-32002, "Request pending"));
        assert_eq!(err, ConnectError::AlreadyPending);
    }

    #[test]
    fn test_normalize_unrecognized_error() {
        let err = normalize("Trust Wallet", ProviderError::new("chain disconnected"));
        assert_eq!(
            err,
            ConnectError::Provider {
                wallet: "Trust Wallet".into(),
                message: "chain disconnected".into(),
            }
        );
    }

    #[test]
    fn test_first_account_takes_first_in_provider_order() {
        let value = json!(["0xaaa111", "0xbbb222"]);
        assert_eq!(first_account("MetaMask", &value).unwrap().as_str(), "0xaaa111");
    }

    #[test]
    fn test_empty_account_list_is_a_failure() {
        let value = json!([]);
        assert!(matches!(
            first_account("MetaMask", &value),
            Err(ConnectError::NoAccountReturned { wallet }) if wallet == "MetaMask"
        ));
    }

    #[test]
    fn test_malformed_result_is_a_failure() {
        assert!(first_account("MetaMask", &json!(null)).is_err());
        assert!(first_account("MetaMask", &json!([42])).is_err());
        assert!(first_account("MetaMask", &json!([""])).is_err());
    }
}
