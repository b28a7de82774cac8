//! Serial JSON-RPC demo: emulated board and host client on one machine.
//!
//! ```text
//! ┌──────────────────────┐   LinkedTransport   ┌──────────────────────┐
//! │  host (main thread)  │ ──── request\n ───▶ │ board (thread)       │
//! │  RpcClient           │ ◀── response\n ──── │ RpcEngine + LedBoard │
//! └──────────────────────┘                     └──────────────────────┘
//! ```
//!
//! Usage: `serial-jsonrpc-demo [led_on|led_off]`
//!
//! Engine and client log through `log`; set `RUST_LOG=debug` to see every
//! line on the wire.
#![deny(unused_must_use)]

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use serial_jsonrpc::{
    ErrorCode, FeedOutcome, LinkError, LinkedTransport, ResponseEncoder, RpcClient, RpcEngine,
    RpcHandler, Transport,
};

// ── Board side ────────────────────────────────────────────────

/// Emulated board exposing the built-in LED.
#[derive(Default)]
struct LedBoard {
    led_on: bool,
}

impl<T: Transport> RpcHandler<T> for LedBoard {
    fn handle(
        &mut self,
        id: i32,
        method: &str,
        params: &[String],
        responder: &mut ResponseEncoder<'_, T>,
    ) -> Result<(), LinkError<T::Error>> {
        match method {
            "set_builtin_led" => match params {
                [state] if state == "0" || state == "1" => {
                    self.led_on = state == "1";
                    responder.send_string_result(id, if self.led_on { "on" } else { "off" })
                }
                _ => responder.send_error_code(id, ErrorCode::InvalidParams, Some("expected 0 or 1")),
            },
            "get_builtin_led" => responder.send_byte_array_result(id, &[u8::from(self.led_on)]),
            _ => responder.send_error_code(id, ErrorCode::MethodNotFound, Some(method)),
        }
    }
}

fn run_board(transport: LinkedTransport, stop: &AtomicBool) -> Result<LedBoard> {
    let mut engine: RpcEngine<_, _> = RpcEngine::new(transport, LedBoard::default());
    engine.init()?;
    engine.responder().send_string_result(0, "ready")?;

    while !stop.load(Ordering::Relaxed) {
        if engine.feed_available_bytes()? == FeedOutcome::Idle {
            thread::sleep(Duration::from_millis(1));
        }
    }

    Ok(engine.into_parts().1)
}

// ── Logging ───────────────────────────────────────────────────

/// Install the stderr subscriber. `log` records from the engine and the
/// client are forwarded to it.
fn init_logging(filter: EnvFilter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("logger: {e}"))
}

// ── Host side ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Method {
    LedOn,
    LedOff,
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "led_on" => Ok(Self::LedOn),
            "led_off" => Ok(Self::LedOff),
            other => bail!("unknown method: {other} (expected led_on or led_off)"),
        }
    }
}

fn main() -> Result<()> {
    init_logging(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))?;

    let method: Method = std::env::args()
        .nth(1)
        .as_deref()
        .unwrap_or("led_on")
        .parse()?;

    let (board_end, host_end) = LinkedTransport::pair();
    let stop = Arc::new(AtomicBool::new(false));
    let board = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || run_board(board_end, &stop))
    };

    let mut client = RpcClient::new(host_end);
    if let Some(greeting) = client.init()? {
        println!("init: {greeting}");
    }

    let state = match method {
        Method::LedOn => 1,
        Method::LedOff => 0,
    };
    let outcome = client.send_request("set_builtin_led", &[json!(state)]);

    stop.store(true, Ordering::Relaxed);
    let led = board
        .join()
        .map_err(|_| anyhow!("board thread panicked"))??;

    let result = outcome?;
    println!("{method:?}: {result} (led_on={})", led.led_on);
    Ok(())
}
