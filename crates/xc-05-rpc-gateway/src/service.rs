//! RPC gateway service: axum HTTP endpoint speaking JSON-RPC 2.0.

use crate::domain::config::GatewayConfig;
use crate::domain::error::{ApiError, GatewayError};
use crate::router::route_method;
use crate::rpc::ExpressRpc;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

#[derive(Clone)]
struct AppState {
    rpc: Arc<ExpressRpc>,
    max_batch_size: usize,
}

pub struct GatewayService {
    config: GatewayConfig,
    rpc: Arc<ExpressRpc>,
}

impl GatewayService {
    pub fn new(config: GatewayConfig, rpc: Arc<ExpressRpc>) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self { config, rpc })
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            rpc: Arc::clone(&self.rpc),
            max_batch_size: self.config.max_batch_size,
        };
        Router::new()
            .route("/", post(handle_json_rpc))
            .route("/health", get(health_check))
            .layer(DefaultBodyLimit::max(self.config.max_request_size))
            .with_state(state)
    }

    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        TcpListener::bind(self.config.addr())
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", self.config.addr(), e)))
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), GatewayError> {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = ?addr, "[xc-05] RPC gateway listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Serve(e.to_string()))?;
        info!("[xc-05] RPC gateway stopped");
        Ok(())
    }
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn handle_json_rpc(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_response(Value::Null, ApiError::parse_error(e.to_string()))),
            );
        }
    };

    let response = match request {
        Value::Array(requests) => {
            if requests.len() > state.max_batch_size {
                error_response(
                    Value::Null,
                    ApiError::invalid_request(format!("batch larger than {}", state.max_batch_size)),
                )
            } else {
                let mut responses = Vec::with_capacity(requests.len());
                for req in &requests {
                    responses.push(process_request(&state.rpc, req).await);
                }
                Value::Array(responses)
            }
        }
        single => process_request(&state.rpc, &single).await,
    };
    (StatusCode::OK, Json(response))
}

fn error_response(id: Value, error: ApiError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": error,
        "id": id,
    })
}

/// Process one JSON-RPC request object into a response object.
pub async fn process_request(rpc: &ExpressRpc, request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let Some(method) = request.get("method").and_then(Value::as_str) else {
        return error_response(id, ApiError::invalid_request("missing method"));
    };
    debug!(method, "[xc-05] Handling request");

    match route_method(rpc, method, request.get("params")).await {
        Ok(result) => json!({
            "jsonrpc": "2.0",
            "result": result,
            "id": id,
        }),
        Err(error) => {
            warn!(method, code = error.code, message = %error.message, "[xc-05] Request failed");
            error_response(id, error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::NodeIdentity;
    use shared_crypto::KeyPair;
    use shared_types::{Contract, ScriptHash, Wallet, WalletAccount, GENESIS_ACCOUNT_LABEL};
    use tempfile::TempDir;
    use crate::adapters::store_handle::StoreHandle;
    use xc_01_kv_store::{RocksDbConfig, RocksDbStore};
    use xc_02_checkpoint::{CheckpointConfig, CheckpointManager};
    use xc_03_tx_builder::test_utils::MockLedger;
    use xc_03_tx_builder::{TransactionBuilder, GAS, NEO};
    use xc_04_multisig::{CoordinatorConfig, MultiSigCoordinator, SignerEndpoint, WalletSigner};

    struct Fixture {
        _dir: TempDir,
        dir_path: std::path::PathBuf,
        store: StoreHandle,
        ledger: MockLedger,
        rpc: ExpressRpc,
        keys: Vec<KeyPair>,
        genesis: Contract,
    }

    fn fixture(validators: usize) -> Fixture {
        let dir = TempDir::new().unwrap();
        let dir_path = dir.path().to_path_buf();
        let store = StoreHandle::new(Arc::new(
            RocksDbStore::open(RocksDbConfig::for_testing(dir.path().join("db"))).unwrap(),
        ));

        let keys: Vec<KeyPair> = (0..validators)
            .map(|i| KeyPair::from_bytes([i as u8 + 40; 32]).unwrap())
            .collect();
        let publics: Vec<_> = keys.iter().map(KeyPair::public_key).collect();
        let genesis = Contract::multi_sig(validators * 2 / 3 + 1, &publics).unwrap();
        let mut wallet = Wallet::new("node1");
        wallet.add_account(WalletAccount::single(keys[0].clone(), true));
        wallet.add_account(WalletAccount::for_contract(
            &genesis,
            Some(keys[0].clone()),
            Some(GENESIS_ACCOUNT_LABEL),
        ));
        let default_account = wallet.default_account().unwrap().script_hash();

        let ledger = MockLedger::new();
        let local: Arc<dyn SignerEndpoint> = Arc::new(WalletSigner::spawn(wallet, 8));
        let coordinator = Arc::new(MultiSigCoordinator::new(
            CoordinatorConfig::for_testing(),
            Arc::new(ledger.clone()),
            local.clone(),
            vec![local],
        ));
        let rpc = ExpressRpc::new(
            NodeIdentity {
                magic: 5566,
                validator_count: validators,
                default_account,
            },
            store.clone(),
            CheckpointManager::new(CheckpointConfig::for_testing(dir.path().join("scratch"))),
            Arc::new(ledger.clone()),
            TransactionBuilder::default(),
            coordinator,
        );
        Fixture {
            _dir: dir,
            dir_path,
            store,
            ledger,
            rpc,
            keys,
            genesis,
        }
    }

    async fn call(rpc: &ExpressRpc, method: &str, params: Value) -> Value {
        process_request(rpc, &json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params}))
            .await
    }

    #[tokio::test]
    async fn test_show_coins() {
        let f = fixture(1);
        let account = ScriptHash([7; 20]);
        f.ledger.set_balance(NEO.hash(), account, 100);
        f.ledger.set_balance(GAS.hash(), account, 1_050_000_000);

        let response = call(&f.rpc, "express-show-coins", json!([account.to_address()])).await;
        assert_eq!(response["result"]["NEO"], "100");
        assert_eq!(response["result"]["GAS"], "10.5");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let f = fixture(1);
        let response = call(&f.rpc, "express-reset", json!([])).await;
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["id"], 1);
    }

    #[tokio::test]
    async fn test_create_checkpoint_single_node() {
        let f = fixture(1);
        let target = f.dir_path.join("cp.tar.zst");
        let filename = target.to_string_lossy().to_string();

        let response = call(&f.rpc, "express-create-checkpoint", json!([filename.clone()])).await;
        assert_eq!(response["result"], filename);
        assert!(target.exists());

        let again = call(&f.rpc, "express-create-checkpoint", json!([filename])).await;
        assert_eq!(again["error"]["code"], -32011);
    }

    #[tokio::test]
    async fn test_create_checkpoint_after_store_revoked() {
        let f = fixture(1);
        assert!(f.store.revoke().is_some());

        let target = f.dir_path.join("late.tar.zst");
        let response = call(
            &f.rpc,
            "express-create-checkpoint",
            json!([target.to_string_lossy()]),
        )
        .await;
        assert_eq!(response["error"]["code"], -32002);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_create_checkpoint_rejected_for_multi_node() {
        let f = fixture(4);
        let target = f.dir_path.join("cp.tar.zst");
        let response = call(
            &f.rpc,
            "express-create-checkpoint",
            json!([target.to_string_lossy()]),
        )
        .await;
        assert_eq!(response["error"]["code"], -32011);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_transfer_then_submit_signatures() {
        let f = fixture(4);
        let sender = f.genesis.script_hash();
        f.ledger.set_balance(GAS.hash(), sender, 1_000 * 100_000_000);
        let receiver = ScriptHash([9; 20]);

        let response = call(
            &f.rpc,
            "express-transfer",
            json!(["gas", "100", sender.to_address(), receiver.to_address(), hex::encode(&f.genesis.script)]),
        )
        .await;
        let pending = &response["result"];
        assert_eq!(pending["script-hashes"], json!([sender.to_address()]));
        let hash_data = hex::decode(pending["hash-data"].as_str().unwrap()).unwrap();

        let signatures: Vec<Value> = f.keys[1..3]
            .iter()
            .map(|key| {
                json!({
                    "signature": hex::encode(key.sign(&hash_data).as_bytes()),
                    "public-key": hex::encode(key.public_key().as_bytes()),
                    "contract": {
                        "script": hex::encode(&f.genesis.script),
                        "parameters": ["Signature", "Signature", "Signature"],
                    }
                })
            })
            .collect();
        let response = call(
            &f.rpc,
            "express-submit-signatures",
            json!([pending["contract-context"].clone(), signatures]),
        )
        .await;
        assert!(response["result"]["txid"].is_string(), "{}", response);
        assert_eq!(f.ledger.balance(&GAS.hash(), &receiver), 100 * 100_000_000);
    }

    #[tokio::test]
    async fn test_transfer_invalid_quantity() {
        let f = fixture(1);
        let response = call(
            &f.rpc,
            "express-transfer",
            json!(["neo", "1.5", ScriptHash([1; 20]).to_address(), ScriptHash([2; 20]).to_address(), ""]),
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_submit_tampered_signature() {
        let f = fixture(4);
        let sender = f.genesis.script_hash();
        f.ledger.set_balance(GAS.hash(), sender, 1_000 * 100_000_000);
        let response = call(
            &f.rpc,
            "express-transfer",
            json!(["gas", "1", sender.to_address(), ScriptHash([9; 20]).to_address(), ""]),
        )
        .await;
        let pending = response["result"].clone();

        let bad = json!([{
            "signature": hex::encode(f.keys[1].sign(b"wrong").as_bytes()),
            "public-key": hex::encode(f.keys[1].public_key().as_bytes()),
            "contract": {
                "script": hex::encode(&f.genesis.script),
                "parameters": ["Signature", "Signature", "Signature"],
            }
        }]);
        let response = call(
            &f.rpc,
            "express-submit-signatures",
            json!([pending["contract-context"].clone(), bad]),
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
        assert!(f.ledger.relayed().is_empty());
    }
}
