use std::time::Duration;

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(200);
pub const ITEMS_MEDIUM: usize = 200;
pub const ITEMS_HIGH: usize = 1000;
