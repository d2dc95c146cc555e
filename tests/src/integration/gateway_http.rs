//! # Gateway Over HTTP
//!
//! Runs a single-node `NodeRuntime` and talks JSON-RPC to it through a
//! plain TCP socket.

use super::fixtures::Network;
use node_runtime::{NodeConfig, NodeRuntime};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use xc_03_tx_builder::{GAS, NEO};

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn connect(port: u16) -> TcpStream {
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", port)).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("gateway did not start on port {}", port);
}

async fn post(port: u16, body: &Value) -> Value {
    let body = body.to_string();
    let request = format!(
        "POST / HTTP/1.1\r\nHost: 127.0.0.1:{}\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        port,
        body.len(),
        body
    );
    let mut stream = connect(port).await;
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();

    let text = String::from_utf8(raw).unwrap();
    assert!(text.starts_with("HTTP/1.1 200"), "{}", text);
    let (_, payload) = text.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(payload).unwrap()
}

#[tokio::test]
async fn test_single_node_serves_express_methods() {
    let root = TempDir::new().unwrap();
    let net = Network::create(1);
    let genesis = net.genesis.script_hash();
    net.ledger.set_balance(NEO.hash(), genesis, 100_000_000);
    net.ledger.set_balance(GAS.hash(), genesis, 5_200_000_000);

    let port = free_port();
    let node = NodeRuntime::new(
        NodeConfig::for_testing(root.path()),
        net.chain.clone(),
        0,
        Arc::new(net.ledger.clone()),
    )
    .unwrap()
    .with_rpc_port(port);
    let (stop, shutdown) = watch::channel(false);
    let running = tokio::spawn(async move { node.run(shutdown).await });

    let coins = post(
        port,
        &json!({"jsonrpc": "2.0", "id": 1, "method": "express-show-coins", "params": [genesis.to_address()]}),
    )
    .await;
    assert_eq!(coins["id"], 1);
    assert_eq!(coins["result"], json!({"NEO": "100000000", "GAS": "52"}));

    let batch = post(
        port,
        &json!([
            {"jsonrpc": "2.0", "id": "a", "method": "express-transfer",
             "params": ["neo", "25", genesis.to_address(), net.default_account(0).to_address(), ""]},
            {"jsonrpc": "2.0", "id": "b", "method": "express-mint", "params": []},
        ]),
    )
    .await;
    let responses = batch.as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], "a");
    assert!(responses[0]["result"]["txid"].is_string(), "{}", responses[0]);
    assert_eq!(responses[1]["error"]["code"], -32601);
    assert_eq!(
        net.ledger.balance(&NEO.hash(), &net.default_account(0)),
        25
    );

    let archive = root.path().join("node.tar.zst");
    let created = post(
        port,
        &json!({"jsonrpc": "2.0", "id": 2, "method": "express-create-checkpoint",
                "params": [archive.to_string_lossy()]}),
    )
    .await;
    assert_eq!(created["result"], json!(archive.to_string_lossy()));
    assert!(archive.is_file());

    stop.send(true).unwrap();
    running.await.unwrap().unwrap();
}
