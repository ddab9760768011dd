//! System-wide constants for the pilot workspace.
//!
//! Numeric limits and default paths shared by every crate in the
//! workspace; other crates import these rather than redefining them.

use static_assertions::const_assert;

/// Default control-loop period in milliseconds (operator control, pre-match).
pub const LOOP_PERIOD_MS: u64 = 20;

/// Shortest accepted control-loop period [ms].
pub const LOOP_PERIOD_MS_MIN: u64 = 5;

/// Longest accepted control-loop period [ms].
pub const LOOP_PERIOD_MS_MAX: u64 = 100;

/// Default telemetry refresh interval in milliseconds.
pub const TELEMETRY_INTERVAL_MS: u64 = 20;

/// Shortest accepted telemetry interval [ms].
pub const TELEMETRY_INTERVAL_MS_MIN: u64 = 5;

/// Longest accepted telemetry interval [ms].
pub const TELEMETRY_INTERVAL_MS_MAX: u64 = 1000;

/// Default display event-pump interval in milliseconds.
pub const DISPLAY_PUMP_MS: u64 = 10;

/// Maximum number of actuators in the mechanism group.
pub const MAX_MECHANISM_ACTUATORS: usize = 4;

/// Maximum number of entries in the routine catalog.
pub const MAX_ROUTINES: usize = 32;

/// Capacity of a display text buffer in bytes.
pub const LABEL_TEXT_CAPACITY: usize = 32;

/// Full-scale magnitude of a signed percentage.
pub const PERCENT_MAX: i8 = 100;

/// Lowest V5 smart port number.
pub const SMART_PORT_MIN: u8 = 1;

/// Highest V5 smart port number.
pub const SMART_PORT_MAX: u8 = 21;

/// Lowest three-wire (ADI) port number.
pub const ADI_PORT_MIN: u8 = 1;

/// Highest three-wire (ADI) port number.
pub const ADI_PORT_MAX: u8 = 8;

/// Default robot configuration path.
pub const DEFAULT_CONFIG_PATH: &str = "config/robot.toml";

// Catalog indices are carried as `u8`.
const_assert!(MAX_ROUTINES <= u8::MAX as usize);
// "Theta: -123456.789" must fit without truncation for realistic poses.
const_assert!(LABEL_TEXT_CAPACITY >= 20);
