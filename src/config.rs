//! Session configuration

use std::time::Duration;

/// Settings applied to every request/response cycle of a [`Reader7941w`](crate::Reader7941w)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Module address placed in every command frame
    pub address: u8,

    /// Time the module needs to process a command before its reply is read
    pub settle_delay: Duration,

    /// Upper bound for each read from the transport
    pub read_timeout: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            address: 0x00,
            settle_delay: Duration::from_millis(500),
            read_timeout: Duration::from_secs(1),
        }
    }
}

impl ReaderConfig {
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Read timeout in whole milliseconds, saturated to the transport's `u32` range
    pub(crate) fn read_timeout_ms(&self) -> u32 {
        u32::try_from(self.read_timeout.as_millis()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_module_timings() {
        let config = ReaderConfig::default();
        assert_eq!(config.address, 0x00);
        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert_eq!(config.read_timeout_ms(), 1000);
    }

    #[test]
    fn test_builders() {
        let config = ReaderConfig::default()
            .with_address(0x03)
            .with_settle_delay(Duration::ZERO)
            .with_read_timeout(Duration::from_millis(250));
        assert_eq!(config.address, 0x03);
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.read_timeout_ms(), 250);
    }

    #[test]
    fn test_read_timeout_saturates() {
        let config = ReaderConfig::default().with_read_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(config.read_timeout_ms(), u32::MAX);
    }
}
