//! End-to-end client tests against an in-process JSON-RPC stub node.

use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use glif_primitives::{Address, Hash, U256};
use glif_rpc::{BlockTag, CallRequest, EthClient, LotusClient, RpcError, RpcTransport};
use serde_json::{json, Value};

const KNOWN_CID: &str = "bafy2bzacedknowncid";
const TOKEN: &str = "secret";

fn known_hash() -> Hash {
    Hash::repeat_byte(0xab)
}

fn sender() -> Address {
    Address::repeat_byte(0x11)
}

fn reply(id: Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

async fn handle(headers: HeaderMap, Json(request): Json<Value>) -> Response {
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let id = request["id"].clone();
    let params = request["params"].clone();

    if method.starts_with("Filecoin.") {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if auth.as_deref() != Some("Bearer secret") {
            return (StatusCode::UNAUTHORIZED, "missing or invalid token").into_response();
        }
    }

    let known = serde_json::to_value(known_hash()).unwrap();
    let body = match method.as_str() {
        "eth_chainId" => reply(id, json!("0x4cb2f")),
        "eth_blockNumber" => reply(id, json!("0x100")),
        "eth_getTransactionCount" => {
            let nonce = if params[1] == json!("pending") { "0x7" } else { "0x5" };
            reply(id, json!(nonce))
        }
        "eth_getBalance" => reply(id, json!("0xde0b6b3a7640000")),
        "eth_getTransactionByHash" if params[0] == known => reply(
            id,
            json!({
                "hash": known,
                "nonce": "0x5",
                "from": sender(),
                "to": sender(),
                "value": "0x1",
                "gas": "0x5208",
                "maxFeePerGas": "0x2710",
                "maxPriorityFeePerGas": "0x3e8",
                "input": "0x",
                "chainId": "0x4cb2f",
                "blockHash": null,
                "blockNumber": null
            }),
        ),
        "eth_getTransactionByHash" | "eth_getTransactionReceipt" => reply(id, Value::Null),
        "eth_sendRawTransaction" => {
            if params[0] == json!("0x") {
                json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32000, "message": "empty transaction"}})
            } else {
                reply(id, known)
            }
        }
        "eth_maxPriorityFeePerGas" => reply(id, json!("0x3e8")),
        "eth_getBlockByNumber" => reply(
            id,
            json!({"number": "0x100", "timestamp": "0x6500", "baseFeePerGas": "0x64"}),
        ),
        "eth_estimateGas" => reply(id, json!("0x5208")),
        "Filecoin.EthGetTransactionHashByCid" => {
            if params[0]["/"] == json!(KNOWN_CID) {
                reply(id, known)
            } else {
                reply(id, Value::Null)
            }
        }
        "Filecoin.EthGetMessageCidByTransactionHash" => reply(id, json!({"/": KNOWN_CID})),
        "Filecoin.Version" => reply(
            id,
            json!({"Version": "1.28.1+calibnet", "APIVersion": 66816, "BlockDelay": 30}),
        ),
        "glif_noResult" => json!({"jsonrpc": "2.0", "id": id}),
        _ => json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32601, "message": "method not found"}}),
    };

    Json(body).into_response()
}

async fn spawn_stub() -> String {
    let app = Router::new().route("/rpc/v1", post(handle));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/rpc/v1")
}

fn eth(url: &str) -> EthClient {
    EthClient::new(RpcTransport::new(url, None, Duration::from_secs(5)).unwrap())
}

fn lotus(url: &str, token: Option<&str>) -> LotusClient {
    LotusClient::new(
        RpcTransport::new(url, token.map(str::to_string), Duration::from_secs(5)).unwrap(),
    )
}

#[tokio::test]
async fn test_eth_queries() {
    let url = spawn_stub().await;
    let client = eth(&url);

    assert_eq!(client.chain_id().await.unwrap(), 314_159);
    assert_eq!(client.block_number().await.unwrap(), 256);
    assert_eq!(
        client
            .get_transaction_count(sender(), BlockTag::Pending)
            .await
            .unwrap(),
        7
    );
    assert_eq!(
        client
            .get_transaction_count(sender(), BlockTag::Latest)
            .await
            .unwrap(),
        5
    );
    assert_eq!(
        client.get_balance(sender()).await.unwrap(),
        U256::exp10(18)
    );
    assert_eq!(client.max_priority_fee_per_gas().await.unwrap(), U256::from(1000));
    assert_eq!(client.latest_base_fee().await.unwrap(), U256::from(100));
    assert_eq!(
        client.estimate_gas(&CallRequest::default()).await.unwrap(),
        21_000
    );
}

#[tokio::test]
async fn test_transaction_lookup() {
    let url = spawn_stub().await;
    let client = eth(&url);

    let tx = client
        .get_transaction_by_hash(known_hash())
        .await
        .unwrap()
        .expect("known transaction");
    assert_eq!(tx.nonce, 5);
    assert_eq!(tx.from, sender());
    assert!(tx.is_pending());

    let unknown = client
        .get_transaction_by_hash(Hash::repeat_byte(0x01))
        .await
        .unwrap();
    assert!(unknown.is_none());

    let receipt = client.get_transaction_receipt(known_hash()).await.unwrap();
    assert!(receipt.is_none());
}

#[tokio::test]
async fn test_send_raw_transaction() {
    let url = spawn_stub().await;
    let client = eth(&url);

    let hash = client.send_raw_transaction(&[0x02, 0xc0]).await.unwrap();
    assert_eq!(hash, known_hash());

    let err = client.send_raw_transaction(&[]).await.unwrap_err();
    match err {
        RpcError::Rpc { code, message } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "empty transaction");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_lotus_requires_token() {
    let url = spawn_stub().await;

    let client = lotus(&url, Some(TOKEN));
    assert_eq!(
        client.eth_tx_hash_by_cid(KNOWN_CID).await.unwrap(),
        Some(known_hash())
    );
    assert_eq!(client.eth_tx_hash_by_cid("bafy2bzaceother").await.unwrap(), None);
    assert_eq!(
        client.message_cid_by_eth_hash(known_hash()).await.unwrap(),
        Some(KNOWN_CID.to_string())
    );
    assert_eq!(client.version().await.unwrap().block_delay, 30);

    let anonymous = lotus(&url, None);
    let err = anonymous.version().await.unwrap_err();
    assert!(matches!(err, RpcError::Parse(ref msg) if msg.contains("401")));
}

#[tokio::test]
async fn test_missing_result_and_unknown_method() {
    let url = spawn_stub().await;
    let client = eth(&url);

    let err = client
        .transport()
        .call::<_, String>("glif_noResult", Vec::<()>::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::MissingResult(_)));

    let err = client
        .transport()
        .call::<_, String>("eth_unknown", Vec::<()>::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Rpc { code: -32601, .. }));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = eth(&format!("http://{addr}/rpc/v1"));
    let err = client.chain_id().await.unwrap_err();
    assert!(err.is_transport());
}
