//! Viewer configuration assembly and output.
//!
//! The written file looks like:
//!
//! ```json
//! {
//!   "pixelSizeMicrons": 0.25,
//!   "channels": [
//!     { "name": "Tumour", "rgba": [255, 0, 0], "type": "STRUCTURE" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::channel::ClassDescriptor;
use crate::error::{ChannelConfigError, ChannelConfigResult};
use crate::source::Resolution;

/// Default output file name.
pub const DEFAULT_OUTPUT_FILE: &str = "channels.json";

/// Root of a viewer configuration file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelConfiguration {
    /// Pixel size in microns; `null` when the source has none.
    #[serde(rename = "pixelSizeMicrons")]
    pub pixel_size_microns: Option<Resolution>,
    /// Channels in source class order.
    pub channels: Vec<ClassDescriptor>,
}

impl ChannelConfiguration {
    /// Assemble a configuration from resolved parts, preserving channel order.
    pub fn assemble(
        resolution: Option<Resolution>,
        channels: Vec<ClassDescriptor>,
    ) -> ChannelConfigResult<Self> {
        if channels.is_empty() {
            return Err(ChannelConfigError::EmptyConfiguration);
        }

        Ok(Self {
            pixel_size_microns: resolution,
            channels,
        })
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Always false for an assembled configuration.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> ChannelConfigResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the configuration to a file, creating parent directories.
    ///
    /// The JSON is fully rendered before the file is touched.
    pub fn write_to(&self, path: &Path) -> ChannelConfigResult<()> {
        let json = self.to_json_pretty()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ChannelConfigError::io(parent, e))?;
        }
        std::fs::write(path, json).map_err(|e| ChannelConfigError::io(path, e))?;

        info!(path = %path.display(), channels = self.len(), "wrote channel configuration");
        Ok(())
    }
}
