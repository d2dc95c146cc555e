//! JSON-RPC method routing.

use crate::domain::error::ApiError;
use crate::rpc::{ExpressRpc, SignatureItem};

pub const METHODS: [&str; 4] = [
    "express-create-checkpoint",
    "express-show-coins",
    "express-submit-signatures",
    "express-transfer",
];

/// Route a JSON-RPC method to its handler.
pub async fn route_method(
    rpc: &ExpressRpc,
    method: &str,
    params: Option<&serde_json::Value>,
) -> Result<serde_json::Value, ApiError> {
    match method {
        "express-create-checkpoint" => {
            let filename: String = parse_param(params, 0)?;
            rpc.create_checkpoint(filename).await
        }
        "express-show-coins" => {
            let address: String = parse_param(params, 0)?;
            rpc.show_coins(address)
        }
        "express-submit-signatures" => {
            let context: serde_json::Value = parse_param(params, 0)?;
            let signatures: Vec<SignatureItem> = parse_param(params, 1)?;
            rpc.submit_signatures(context, signatures)
        }
        "express-transfer" => {
            let asset: String = parse_param(params, 0)?;
            let quantity: String = parse_param(params, 1)?;
            let sender: String = parse_param(params, 2)?;
            let receiver: String = parse_param(params, 3)?;
            let witness: Option<String> = parse_param_optional::<String>(params, 4)
                .filter(|s| !s.is_empty());
            rpc.transfer(asset, quantity, sender, receiver, witness).await
        }
        _ => Err(ApiError::method_not_found(method)),
    }
}

/// Parse a positional parameter from the JSON-RPC params array.
fn parse_param<T: serde::de::DeserializeOwned>(
    params: Option<&serde_json::Value>,
    index: usize,
) -> Result<T, ApiError> {
    let param = params
        .and_then(|p| p.as_array())
        .and_then(|p| p.get(index))
        .ok_or_else(|| ApiError::invalid_params(format!("missing parameter at index {}", index)))?;

    serde_json::from_value(param.clone()).map_err(|e| {
        ApiError::invalid_params(format!("invalid parameter at index {}: {}", index, e))
    })
}

fn parse_param_optional<T: serde::de::DeserializeOwned>(
    params: Option<&serde_json::Value>,
    index: usize,
) -> Option<T> {
    params
        .and_then(|p| p.as_array())
        .and_then(|p| p.get(index))
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_param_positions() {
        let params = json!(["gas", "1.5"]);
        let asset: String = parse_param(Some(&params), 0).unwrap();
        assert_eq!(asset, "gas");
        let missing: Result<String, _> = parse_param(Some(&params), 2);
        assert_eq!(missing.unwrap_err().code, -32602);
        assert!(parse_param_optional::<String>(Some(&params), 4).is_none());
    }

    #[test]
    fn test_non_array_params_rejected() {
        let params = json!({"filename": "x"});
        let result: Result<String, _> = parse_param(Some(&params), 0);
        assert!(result.is_err());
    }
}
