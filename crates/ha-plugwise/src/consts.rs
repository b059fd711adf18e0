//! Plugwise constants

pub const DOMAIN: &str = "plugwise";

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_USERNAME: &str = "smile";

/// Options key overriding the poll interval, in seconds
pub const CONF_SCAN_INTERVAL: &str = "scan_interval";

pub const MANUFACTURER: &str = "Plugwise";
