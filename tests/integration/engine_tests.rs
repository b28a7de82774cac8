//! Board-side behaviour: framing, envelope validation, dispatch and the
//! response shapes, driven through a simulated serial port.

use serde_json::json;
use serial_jsonrpc::{ErrorCode, FeedOutcome};

use super::mock_board::{Call, board, responses};

/// Feed until the port is drained, collecting every outcome.
fn drain(engine: &mut super::mock_board::BoardEngine) -> Vec<FeedOutcome> {
    let mut outcomes = Vec::new();
    loop {
        let outcome = engine.feed_available_bytes().unwrap();
        if matches!(outcome, FeedOutcome::Idle | FeedOutcome::Pending) {
            return outcomes;
        }
        outcomes.push(outcome);
    }
}

#[test]
fn ping_style_request_reaches_handler_with_string_params() {
    let mut e = board(b"{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"echo\",\"params\":[\"a\",2,false]}\n");
    assert_eq!(drain(&mut e), [FeedOutcome::Dispatched]);
    assert_eq!(
        e.handler().last_call(),
        Some(&Call {
            id: 7,
            method: "echo".into(),
            params: vec!["a".into(), "2".into(), "false".into()],
        })
    );
    assert_eq!(
        responses(&mut e),
        [json!({"jsonrpc": "2.0", "id": 7, "result": "a,2,false"})]
    );
}

#[test]
fn every_response_shape_over_one_session() {
    let mut e = board(
        b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"bytes\",\"params\":[\"[0,128,255]\"]}\n\
          {\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"sum\",\"params\":[40,-2,4]}\n\
          {\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"nope\",\"params\":[]}\n",
    );
    assert_eq!(drain(&mut e).len(), 3);
    assert_eq!(
        responses(&mut e),
        [
            json!({"jsonrpc": "2.0", "id": 1, "result": [0, 128, 255]}),
            json!({"jsonrpc": "2.0", "id": 2, "result": [42]}),
            json!({"jsonrpc": "2.0", "id": 3, "error": {
                "code": -32601, "message": "Method not found", "data": "nope"
            }}),
        ]
    );
}

#[test]
fn byte_array_param_over_capacity_is_reported_by_handler() {
    let mut e = board(
        b"{\"jsonrpc\":\"2.0\",\"id\":4,\"method\":\"bytes\",\"params\":[\"[1,2,3,4,5,6,7,8,9]\"]}\n",
    );
    assert_eq!(drain(&mut e), [FeedOutcome::Dispatched]);
    let resp = responses(&mut e);
    assert_eq!(resp[0]["error"]["code"], json!(-32602));
    assert_eq!(resp[0]["error"]["data"], json!("9 elements exceed capacity 8"));
}

#[test]
fn malformed_messages_each_get_one_response_and_do_not_stop_the_loop() {
    let mut e = board(
        b"not json\n\
          {\"id\":5,\"method\":\"echo\",\"params\":[]}\n\
          {\"jsonrpc\":\"2.0\",\"id\":6,\"method\":\"echo\",\"params\":{}}\n\
          {\"jsonrpc\":\"2.0\",\"id\":8,\"method\":\"echo\",\"params\":[\"ok\"]}\n",
    );
    assert_eq!(
        drain(&mut e),
        [
            FeedOutcome::Rejected(ErrorCode::ParseError),
            FeedOutcome::Rejected(ErrorCode::InvalidRequest),
            FeedOutcome::Rejected(ErrorCode::InvalidParams),
            FeedOutcome::Dispatched,
        ]
    );

    let resp = responses(&mut e);
    assert_eq!(resp.len(), 4);
    assert_eq!(resp[0]["id"], json!(0));
    assert_eq!(resp[0]["error"]["code"], json!(-32700));
    assert_eq!(resp[0]["error"]["message"], json!("Parse error"));
    assert!(resp[0]["error"]["data"].is_string());

    assert_eq!(resp[1]["id"], json!(0), "id must not be trusted before validation");
    assert_eq!(resp[1]["error"]["data"], json!("Invalid protocol version"));

    assert_eq!(resp[2]["id"], json!(6));
    assert_eq!(resp[2]["error"]["data"], json!("Array expected"));

    assert_eq!(resp[3], json!({"jsonrpc": "2.0", "id": 8, "result": "ok"}));
    assert_eq!(e.handler().calls.len(), 1);
}

#[test]
fn oversized_message_then_valid_message() {
    let mut input = vec![b' '; 400];
    input.extend_from_slice(b"\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"echo\",\"params\":[\"x\"]}\n");
    let mut e = board(&input);

    assert_eq!(drain(&mut e), [FeedOutcome::Overflow, FeedOutcome::Dispatched]);

    let resp = responses(&mut e);
    assert_eq!(resp.len(), 2);
    assert_eq!(
        resp[0],
        json!({"jsonrpc": "2.0", "id": 0, "error": {
            "code": -32600, "message": "Invalid Request", "data": "message too large"
        }})
    );
    assert_eq!(resp.last(), Some(&json!({"jsonrpc": "2.0", "id": 9, "result": "x"})));
}

#[test]
fn line_many_times_the_buffer_gets_one_response() {
    let mut input = vec![b'a'; 350 * 5];
    input.push(b'\n');
    let mut e = board(&input);

    assert_eq!(drain(&mut e), [FeedOutcome::Overflow]);
    assert_eq!(e.feed_available_bytes().unwrap(), FeedOutcome::Idle);
    assert_eq!(responses(&mut e).len(), 1);
    assert!(e.handler().calls.is_empty());
}

#[test]
fn bytes_trickling_in_across_calls() {
    let msg = b"{\"jsonrpc\":\"2.0\",\"id\":10,\"method\":\"echo\",\"params\":[\"slow\"]}\n";
    let mut e = board(b"");
    for chunk in msg.chunks(5) {
        assert!(e.handler().calls.is_empty());
        e.transport_mut().push_input(chunk);
        let _ = e.feed_available_bytes().unwrap();
    }
    assert_eq!(e.handler().calls.len(), 1);
    assert_eq!(responses(&mut e), [json!({"jsonrpc": "2.0", "id": 10, "result": "slow"})]);
}
