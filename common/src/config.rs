//! Configuration types for a transfer and its output

/// Default buffer capacity, small enough that even tiny files wrap around the buffer
pub const DEFAULT_CAPACITY: usize = 32;

/// Largest accepted capacity, 1 GiB
pub const MAX_CAPACITY: usize = 1 << 30;

/// Relay engine configuration
#[derive(Debug, Clone, Copy)]
pub struct RelayConfig {
    /// Circular buffer capacity in bytes
    pub capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl RelayConfig {
    /// Validate configuration and return errors if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be at least one byte".to_string());
        }
        if self.capacity > MAX_CAPACITY {
            return Err(format!("capacity must not exceed {MAX_CAPACITY} bytes"));
        }
        Ok(())
    }
}

/// Output and logging configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress error output
    pub quiet: bool,
    /// Verbosity level: 0=ERROR, 1=INFO, 2=DEBUG, 3=TRACE
    pub verbose: u8,
    /// Print summary statistics at the end
    pub print_summary: bool,
}

impl OutputConfig {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "error",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
