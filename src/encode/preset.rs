use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Named encoder quality presets offered on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    /// Visually lossless, slow
    #[default]
    High,
    Medium,
    /// Smaller files, fast
    Low,
}

impl QualityPreset {
    pub fn all() -> [QualityPreset; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Encoder parameters for this preset
    pub fn profile(&self) -> EncodingProfile {
        match self {
            Self::High => EncodingProfile { crf: 18, speed: "slow" },
            Self::Medium => EncodingProfile { crf: 20, speed: "medium" },
            Self::Low => EncodingProfile { crf: 22, speed: "fast" },
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// x264 rate/speed pair applied uniformly to every clip of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingProfile {
    /// Constant rate factor, lower is better quality
    pub crf: u8,

    /// x264 `-preset` label
    pub speed: &'static str,
}

impl From<QualityPreset> for EncodingProfile {
    fn from(preset: QualityPreset) -> Self {
        preset.profile()
    }
}
