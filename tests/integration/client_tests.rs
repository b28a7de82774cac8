//! Host client against a live board engine on another thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use serde_json::json;
use serial_jsonrpc::{
    ClientConfig, ClientError, ErrorCode, FeedOutcome, LinkedTransport, RpcClient, RpcEngine,
};

use super::mock_board::MockBoard;

fn with_board<F>(f: F) -> MockBoard
where
    F: FnOnce(&mut RpcClient<LinkedTransport>),
{
    let (board_end, host_end) = LinkedTransport::pair();
    let stop = Arc::new(AtomicBool::new(false));
    let board = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut engine: RpcEngine<_, _> = RpcEngine::new(board_end, MockBoard::new());
            while !stop.load(Ordering::Relaxed) {
                if engine.feed_available_bytes().unwrap() == FeedOutcome::Idle {
                    thread::sleep(Duration::from_millis(1));
                }
            }
            engine.into_parts().1
        })
    };

    let config = ClientConfig {
        init_timeout_ms: 50,
        read_timeout_ms: 2000,
        poll_interval_ms: 1,
        ..ClientConfig::default()
    };
    let mut client = RpcClient::with_config(host_end, config);
    f(&mut client);

    stop.store(true, Ordering::Relaxed);
    board.join().expect("board thread")
}

#[test]
fn round_trip_results() {
    let board = with_board(|c| {
        assert_eq!(c.init().unwrap(), None, "mock board sends no greeting");
        assert_eq!(
            c.send_request("echo", &[json!("a"), json!(1)]).unwrap(),
            json!("a,1")
        );
        assert_eq!(
            c.send_request("bytes", &[json!("[7,8]")]).unwrap(),
            json!([7, 8])
        );
        assert_eq!(c.send_request("sum", &[]).unwrap(), json!([0]));
    });

    let ids: Vec<i32> = board.calls.iter().map(|c| c.id).collect();
    assert_eq!(ids, [0, 1, 2]);
    assert!(board.calls[2].params.is_empty(), "empty params reach the handler as empty");
}

#[test]
fn error_responses_become_client_errors() {
    with_board(|c| {
        let err = c.send_request("missing", &[]).unwrap_err();
        assert_eq!(err.rpc_code(), Some(ErrorCode::MethodNotFound));

        let err = c.send_request("sum", &[json!("x")]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Rpc { code: -32602, ref message, data: None } if message == "Invalid params"
        ));

        // The link keeps working after errors.
        assert_eq!(c.send_request("echo", &[]).unwrap(), json!(""));
    });
}
