//! Game configuration

use crate::error::ConfigError;
use crate::pieces::{MAX_SIZE, MIN_SIZE};
use serde::{Deserialize, Serialize};

/// Board size and komi for a new game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side length of the board (3 to 8)
    pub size: usize,
    /// Half points added to White's flat count when counting flats
    #[serde(default)]
    pub half_komi: i8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: 5,
            half_komi: 0,
        }
    }
}

impl GameConfig {
    pub fn new(size: usize, half_komi: i8) -> Self {
        Self { size, half_komi }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_half_komi(mut self, half_komi: i8) -> Self {
        self.half_komi = half_komi;
        self
    }

    /// Check the size is supported and the komi could ever matter
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&self.size) {
            return Err(ConfigError::InvalidSize(self.size));
        }
        // A komi larger than a board covered in flats is meaningless
        let limit = 2 * (self.size * self.size) as i32;
        if i32::from(self.half_komi).abs() > limit {
            return Err(ConfigError::InvalidKomi {
                half_komi: self.half_komi,
                size: self.size,
            });
        }
        Ok(())
    }
}
