//! RPC client tests against a mock node.

use alloy_primitives::B256;
use serde_json::{Value, json};
use spore_mint::{CellProvider, LedgerClient, TxStatus};
use spore_primitives::{
    Capacity, Cell, CellInput, CellOutput, OutPoint, RawTransaction, Script, ScriptHashType,
    Transaction, WitnessArgs,
};
use spore_rpc::{RetryPolicy, RpcClient, RpcError};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn lock() -> Script {
    Script::new(B256::repeat_byte(0x9b), ScriptHashType::Type, vec![0xab; 20])
}

fn client(server: &MockServer) -> RpcClient {
    RpcClient::new(&server.uri(), &server.uri())
        .expect("client")
        .with_retry_policy(RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        })
}

fn hex32(byte: u8) -> String {
    format!("0x{}", hex_byte(byte).repeat(32))
}

fn hex_byte(byte: u8) -> String {
    format!("{byte:02x}")
}

fn indexer_cell(tx: u8, capacity: u64, data: &str) -> Value {
    json!({
        "output": {
            "capacity": format!("{capacity:#x}"),
            "lock": {
                "code_hash": hex32(0x9b),
                "hash_type": "type",
                "args": format!("0x{}", "ab".repeat(20)),
            },
            "type": null,
        },
        "output_data": data,
        "out_point": { "tx_hash": hex32(tx), "index": "0x0" },
        "block_number": "0x1",
        "tx_index": "0x0",
    })
}

fn rpc_result(request: &Request, result: Value) -> ResponseTemplate {
    let body: Value = serde_json::from_slice(&request.body).expect("json body");
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": body["id"],
        "result": result,
    }))
}

/// Serves two pages of cells keyed on the request cursor.
struct PagedIndexer;

impl Respond for PagedIndexer {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).expect("json body");
        let params = &body["params"];
        assert_eq!(params[0]["script_type"], "lock");
        assert_eq!(params[0]["filter"]["output_data_len_range"], json!(["0x0", "0x1"]));
        assert_eq!(params[2], "0x2");

        let page = if params[3].is_null() {
            json!({
                "objects": [indexer_cell(1, 100_000_000_000, "0x"), indexer_cell(2, 6_100_000_000, "0x")],
                "last_cursor": "0x01",
            })
        } else {
            assert_eq!(params[3], "0x01");
            json!({
                "objects": [indexer_cell(3, 200_000_000_000, "0x")],
                "last_cursor": "0x02",
            })
        };
        rpc_result(request, page)
    }
}

#[tokio::test]
async fn test_live_cells_follow_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "get_cells" })))
        .respond_with(PagedIndexer)
        .expect(2)
        .mount(&server)
        .await;

    let cells = client(&server)
        .with_page_size(2)
        .live_cells(&lock())
        .await
        .expect("cells");

    assert_eq!(cells.len(), 3);
    assert_eq!(cells[0].out_point, OutPoint::new(B256::repeat_byte(1), 0));
    assert_eq!(cells[1].cell.capacity(), Capacity::ckb(61).unwrap());
    assert_eq!(cells[2].cell.capacity(), Capacity::ckb(2_000).unwrap());
    assert!(cells.iter().all(|cell| cell.cell.lock() == &lock()));
}

fn transaction() -> Transaction {
    let mut raw = RawTransaction::default();
    raw.inputs.push(CellInput::new(OutPoint::new(B256::repeat_byte(1), 0)));
    raw.push_cell(&Cell::new(
        CellOutput::new(Capacity::ckb(61).unwrap(), lock(), None),
        Vec::new(),
    ));
    Transaction::new(raw, vec![WitnessArgs::with_signature([7u8; 65]).serialize()])
}

/// Checks the submitted transaction and echoes its hash.
struct Node {
    tx_hash: B256,
}

impl Respond for Node {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).expect("json body");
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["params"][1], "passthrough");
        let tx = &body["params"][0];
        assert_eq!(tx["outputs"][0]["capacity"], "0x16b969d00");
        assert_eq!(tx["inputs"][0]["previous_output"]["tx_hash"], hex32(1));
        rpc_result(request, json!(self.tx_hash))
    }
}

#[tokio::test]
async fn test_send_transaction() {
    let server = MockServer::start().await;
    let tx = transaction();
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "send_transaction" })))
        .respond_with(Node { tx_hash: tx.hash() })
        .expect(1)
        .mount(&server)
        .await;

    let hash = LedgerClient::send_transaction(&client(&server), &tx)
        .await
        .expect("sent");
    assert_eq!(hash, tx.hash());
}

#[tokio::test]
async fn test_duplicate_transaction_counts_as_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -1107, "message": "PoolRejectedDuplicatedTransaction" },
        })))
        .mount(&server)
        .await;

    let tx = transaction();
    let hash = client(&server).send_transaction(&tx).await.expect("duplicate");
    assert_eq!(hash, tx.hash());
}

#[tokio::test]
async fn test_rpc_error_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -302, "message": "TransactionFailedToVerify" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .send_transaction(&transaction())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RpcError::Rpc { method: "send_transaction", code: -302, .. }
    ));
}

#[tokio::test]
async fn test_transaction_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": [hex32(1)] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "transaction": null,
                "tx_status": { "status": "committed", "block_hash": hex32(9) },
            },
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": [hex32(2)] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "transaction": null,
                "tx_status": { "status": "rejected", "reason": "out of capacity" },
            },
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": [hex32(3)] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": null,
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let status = |byte| {
        let client = &client;
        async move {
            client
                .transaction_status(&B256::repeat_byte(byte))
                .await
                .expect("status")
        }
    };

    assert_eq!(status(1).await, TxStatus::Committed);
    assert_eq!(status(2).await, TxStatus::Rejected("out of capacity".into()));
    assert_eq!(status(3).await, TxStatus::Unknown);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server)
        .transaction_status(&B256::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Status { status: 503, .. }));
    assert!(err.to_string().contains("busy"));
}

#[tokio::test]
async fn test_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .transaction_status(&B256::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Decode { method: "get_transaction", .. }));
}

#[test]
fn test_rejects_malformed_url() {
    assert!(matches!(
        RpcClient::new("not a url", "http://127.0.0.1:8114"),
        Err(RpcError::Url(_))
    ));
}
