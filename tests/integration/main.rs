//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the link end to end
//! against a mock board.  All tests run on the host (x86_64) with no
//! real serial port required.

mod client_tests;
mod engine_tests;
mod mock_board;
