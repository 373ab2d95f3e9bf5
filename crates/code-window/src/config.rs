use crate::error::{Result, WindowError};
use serde::{Deserialize, Serialize};

/// Sliding-window geometry for the workspace index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Lines per window
    pub window_size: usize,

    /// How many windows should start inside one window span.
    /// The index advances by `window_size / slice_size` lines.
    pub slice_size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            slice_size: 2,
        }
    }
}

impl WindowConfig {
    #[must_use]
    pub const fn new(window_size: usize, slice_size: usize) -> Self {
        Self {
            window_size,
            slice_size,
        }
    }

    /// Line step between consecutive window anchors, never zero
    #[must_use]
    pub fn slice_step(&self) -> usize {
        match self.window_size.checked_div(self.slice_size) {
            Some(step) if step > 0 => step,
            _ => 1,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(WindowError::invalid_config("window_size must be > 0"));
        }
        if self.slice_size == 0 {
            return Err(WindowError::invalid_config("slice_size must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = WindowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slice_step(), 10);
    }

    #[test]
    fn test_slice_step_never_zero() {
        assert_eq!(WindowConfig::new(3, 8).slice_step(), 1);
        assert_eq!(WindowConfig::new(3, 0).slice_step(), 1);
        assert_eq!(WindowConfig::new(21, 2).slice_step(), 10);
    }

    #[test]
    fn test_config_validation() {
        assert!(WindowConfig::new(0, 2).validate().is_err());
        assert!(WindowConfig::new(10, 0).validate().is_err());
        assert!(WindowConfig::new(1, 1).validate().is_ok());
    }
}
