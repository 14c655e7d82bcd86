use std::time::Duration;

// Wall-clock jumps, in milliseconds
pub const TIME_OFFSET1_MS: i64 = 20123;
pub const TIME_OFFSET2_MS: i64 = 5678;

pub const CALL_TIMEOUT_MS: i64 = 5_000;
pub const CONNECT_TIMEOUT_MS: i64 = 5_000;

// How long the echo server takes to accept calls
pub const SERVER_STARTUP: Duration = Duration::from_millis(200);

// How far into a pending connection wait a jump lands
pub const JUMP_DELAY: Duration = Duration::from_millis(50);
