use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for the importer
///
/// Every fixed name the importer relies on (card layout, XML namespaces,
/// codec identifiers, overlay font) lives here so the extractor and the
/// transcode driver can be handed one immutable value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SD card folder layout
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Manifest and sidecar schema settings
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// External encoder settings
    #[serde(default)]
    pub encoder: EncoderConfig,

    /// Timestamp overlay settings
    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.metadata.validate()?;
        self.encoder.validate()?;
        self.overlay.validate()?;
        Ok(())
    }

    /// `<root>/PRIVATE/JVC/BPAV`, the directory manifest URIs are relative to
    pub fn bpav_root<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref()
            .join(&self.layout.private_folder)
            .join(&self.layout.vendor_folder)
            .join(&self.layout.bpav_folder)
    }

    /// Location of MEDIAPRO.xml beneath the card root
    pub fn manifest_path<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        self.bpav_root(root).join(&self.layout.manifest_file)
    }
}

fn require_non_empty(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }.into());
    }
    Ok(())
}

/// SD card folder layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub private_folder: String,
    pub vendor_folder: String,
    pub bpav_folder: String,
    pub manifest_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            private_folder: "PRIVATE".to_string(),
            vendor_folder: "JVC".to_string(),
            bpav_folder: "BPAV".to_string(),
            manifest_file: "MEDIAPRO.xml".to_string(),
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<()> {
        require_non_empty("layout.manifest_file", &self.manifest_file)
    }
}

/// Manifest and sidecar schema settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Namespace of MEDIAPRO.xml
    pub media_profile_namespace: String,

    /// Namespace of the per-clip non-real-time metadata sidecar
    pub non_realtime_namespace: String,

    /// `type` attribute value marking the sidecar among RelevantInfo entries
    pub sidecar_info_type: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            media_profile_namespace: "http://xmlns.sony.net/pro/metadata/mediaprofile".to_string(),
            non_realtime_namespace: "urn:schemas-professionalDisc:nonRealTimeMeta:ver.1.30".to_string(),
            sidecar_info_type: "XML".to_string(),
        }
    }
}

impl MetadataConfig {
    fn validate(&self) -> Result<()> {
        require_non_empty("metadata.media_profile_namespace", &self.media_profile_namespace)?;
        require_non_empty("metadata.non_realtime_namespace", &self.non_realtime_namespace)?;
        Ok(())
    }
}

/// External encoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Encoder binary, looked up on PATH when not absolute
    pub ffmpeg_path: String,

    pub video_codec: String,

    pub audio_codec: String,

    /// Constant audio bitrate passed to `-b:a`
    pub audio_bitrate: String,

    /// Token in the source file name that gets replaced
    pub source_extension: String,

    /// Replacement for `source_extension` in the output file name
    pub converted_suffix: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "256k".to_string(),
            source_extension: ".MP4".to_string(),
            converted_suffix: "_converted.mp4".to_string(),
        }
    }
}

impl EncoderConfig {
    fn validate(&self) -> Result<()> {
        require_non_empty("encoder.ffmpeg_path", &self.ffmpeg_path)?;
        require_non_empty("encoder.video_codec", &self.video_codec)?;
        require_non_empty("encoder.audio_codec", &self.audio_codec)?;
        require_non_empty("encoder.audio_bitrate", &self.audio_bitrate)?;
        require_non_empty("encoder.source_extension", &self.source_extension)?;
        Ok(())
    }
}

/// Timestamp overlay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// TrueType font handed to drawtext
    pub font_path: PathBuf,

    pub font_size: u32,

    /// Distance from the bottom-right corner in pixels
    pub margin: u32,

    pub font_color: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_path: Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("font")
                .join("VCR_OSD_MONO.ttf"),
            font_size: 28,
            margin: 10,
            font_color: "white".to_string(),
        }
    }
}

impl OverlayConfig {
    fn validate(&self) -> Result<()> {
        if self.font_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "overlay.font_size".to_string(),
                value: self.font_size.to_string()
            }.into());
        }

        require_non_empty("overlay.font_color", &self.font_color)
    }
}
