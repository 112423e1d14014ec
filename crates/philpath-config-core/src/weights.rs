//! Model-weights artifacts.
//!
//! A Keras weight file is a hierarchical container:
//!
//! ```text
//! /                          attrs: algorithm (optional, descriptor JSON)
//! └── model_weights/
//!     ├── conv2d/conv2d/{kernel:0, bias:0}
//!     ├── conv2d_1/conv2d_1/{kernel:0, bias:0}
//!     └── ...
//! ```
//!
//! The embedded descriptor is preferred because it carries real class names and
//! the resolution. Without it, the class count is the bias length of the last
//! convolution layer, picked by lexicographic name order.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{ChannelConfigError, ChannelConfigResult};
use crate::source::{AlgorithmDescriptor, ClassSource};

/// Root attribute holding an embedded algorithm descriptor.
pub const EMBEDDED_DESCRIPTOR_ATTR: &str = "algorithm";

/// Group holding one sub-group per layer.
pub const WEIGHTS_GROUP: &str = "model_weights";

/// Substring identifying convolution layers.
pub const CONV_LAYER_MARKER: &str = "conv2d";

/// Read access to a model-weights container.
pub trait WeightsArchive {
    /// Serialized algorithm descriptor stored on the container, if any.
    fn embedded_descriptor(&self) -> ChannelConfigResult<Option<String>>;

    /// Names of all layer groups under the weights group.
    fn layer_names(&self) -> ChannelConfigResult<Vec<String>>;

    /// Length of the bias vector of a layer, or `None` when it has no bias.
    fn bias_length(&self, layer: &str) -> ChannelConfigResult<Option<usize>>;
}

/// Name of the last convolution layer in lexicographic order.
pub fn last_conv_layer(layers: &[String]) -> Option<&str> {
    layers
        .iter()
        .filter(|name| name.contains(CONV_LAYER_MARKER))
        .max()
        .map(String::as_str)
}

/// Synthesized classes for a known count.
pub fn synthesize_from_count(count: usize) -> ClassSource {
    ClassSource::synthesized(count)
}

/// Resolve classes from a weights archive.
///
/// Order of preference: embedded descriptor, explicit count, last convolution
/// layer's bias length. `path` only labels errors.
pub fn class_source_from_weights(
    archive: &dyn WeightsArchive,
    path: &Path,
    explicit_count: Option<usize>,
) -> ChannelConfigResult<ClassSource> {
    if let Some(text) = archive.embedded_descriptor()? {
        info!("using embedded algorithm descriptor");
        return AlgorithmDescriptor::from_json_str(&text, path).map(ClassSource::from);
    }

    if let Some(count) = explicit_count {
        debug!(count, "no embedded descriptor, using explicit class count");
        return Ok(synthesize_from_count(count));
    }

    let layers = archive.layer_names()?;
    let layer = last_conv_layer(&layers).ok_or_else(|| {
        ChannelConfigError::malformed(path, format!("no `{CONV_LAYER_MARKER}` layer found"))
    })?;

    let count = archive.bias_length(layer)?.ok_or_else(|| {
        ChannelConfigError::malformed(path, format!("layer `{layer}` has no bias vector"))
    })?;

    info!(layer, count, "inferred class count from last convolution layer");
    Ok(synthesize_from_count(count))
}

#[cfg(feature = "hdf5")]
pub use self::hdf5_archive::Hdf5Archive;

#[cfg(feature = "hdf5")]
mod hdf5_archive {
    use std::path::{Path, PathBuf};

    use hdf5::types::{VarLenAscii, VarLenUnicode};

    use super::{WeightsArchive, EMBEDDED_DESCRIPTOR_ATTR, WEIGHTS_GROUP};
    use crate::error::{ChannelConfigError, ChannelConfigResult};

    /// [`WeightsArchive`] over a Keras HDF5 file.
    ///
    /// The file handle is closed when the archive is dropped.
    pub struct Hdf5Archive {
        path: PathBuf,
        file: hdf5::File,
    }

    impl Hdf5Archive {
        /// Open a weights file read-only.
        pub fn open(path: &Path) -> ChannelConfigResult<Self> {
            let file = hdf5::File::open(path).map_err(|e| hdf5_error(path, e))?;
            Ok(Self {
                path: path.to_path_buf(),
                file,
            })
        }

        fn err(&self, e: hdf5::Error) -> ChannelConfigError {
            hdf5_error(&self.path, e)
        }
    }

    impl WeightsArchive for Hdf5Archive {
        fn embedded_descriptor(&self) -> ChannelConfigResult<Option<String>> {
            let names = self.file.attr_names().map_err(|e| self.err(e))?;
            if !names.iter().any(|n| n == EMBEDDED_DESCRIPTOR_ATTR) {
                return Ok(None);
            }

            let attr = self
                .file
                .attr(EMBEDDED_DESCRIPTOR_ATTR)
                .map_err(|e| self.err(e))?;

            if let Ok(text) = attr.read_scalar::<VarLenUnicode>() {
                return Ok(Some(text.as_str().to_string()));
            }
            let text = attr
                .read_scalar::<VarLenAscii>()
                .map_err(|e| self.err(e))?;
            Ok(Some(text.as_str().to_string()))
        }

        fn layer_names(&self) -> ChannelConfigResult<Vec<String>> {
            self.file
                .group(WEIGHTS_GROUP)
                .and_then(|g| g.member_names())
                .map_err(|e| self.err(e))
        }

        fn bias_length(&self, layer: &str) -> ChannelConfigResult<Option<usize>> {
            let outer = self
                .file
                .group(WEIGHTS_GROUP)
                .and_then(|g| g.group(layer))
                .map_err(|e| self.err(e))?;

            // Keras nests each layer's variables in a group of the same name.
            let Ok(inner) = outer.group(layer) else {
                return Ok(None);
            };

            let members = inner.member_names().map_err(|e| self.err(e))?;
            let Some(bias) = members.iter().find(|m| m.starts_with("bias")) else {
                return Ok(None);
            };

            let dataset = inner.dataset(bias).map_err(|e| self.err(e))?;
            Ok(Some(dataset.size()))
        }
    }

    fn hdf5_error(path: &Path, e: hdf5::Error) -> ChannelConfigError {
        ChannelConfigError::Hdf5 {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeArchive {
        descriptor: Option<String>,
        biases: HashMap<String, Option<usize>>,
    }

    impl FakeArchive {
        fn with_layer(mut self, name: &str, bias: Option<usize>) -> Self {
            self.biases.insert(name.to_string(), bias);
            self
        }
    }

    impl WeightsArchive for FakeArchive {
        fn embedded_descriptor(&self) -> ChannelConfigResult<Option<String>> {
            Ok(self.descriptor.clone())
        }

        fn layer_names(&self) -> ChannelConfigResult<Vec<String>> {
            Ok(self.biases.keys().cloned().collect())
        }

        fn bias_length(&self, layer: &str) -> ChannelConfigResult<Option<usize>> {
            Ok(self.biases.get(layer).copied().flatten())
        }
    }

    fn path() -> &'static Path {
        Path::new("model.h5")
    }

    #[test]
    fn test_last_conv_layer_is_lexicographic() {
        let layers: Vec<String> = ["conv2d_1", "dense", "conv2d_10", "conv2d_9", "batch_norm"]
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(last_conv_layer(&layers), Some("conv2d_9"));
        assert_eq!(last_conv_layer(&["dense".to_string()]), None);
    }

    #[test]
    fn test_embedded_descriptor_is_preferred() {
        let archive = FakeArchive {
            descriptor: Some(
                r#"{"resolution": "0.5mpp", "classes": {"names": ["Tumour", "Background"]}}"#
                    .to_string(),
            ),
            ..Default::default()
        }
        .with_layer("conv2d", Some(7));

        let source = class_source_from_weights(&archive, path(), Some(3)).unwrap();
        assert_eq!(source.names, vec!["Tumour", "Background"]);
        assert_eq!(source.resolution.unwrap().as_str(), "0.5");
    }

    #[test]
    fn test_bias_length_gives_class_count() {
        let archive = FakeArchive::default()
            .with_layer("conv2d_1", Some(16))
            .with_layer("conv2d_2", Some(4))
            .with_layer("dense", Some(100));

        let source = class_source_from_weights(&archive, path(), None).unwrap();
        assert_eq!(source.names, vec!["Name_0", "Name_1", "Name_2", "Name_3"]);
        assert_eq!(source.resolution, None);
    }

    #[test]
    fn test_explicit_count_skips_layer_scan() {
        let archive = FakeArchive::default().with_layer("conv2d", Some(4));
        let source = class_source_from_weights(&archive, path(), Some(2)).unwrap();
        assert_eq!(source.class_count(), 2);
    }

    #[test]
    fn test_missing_conv_or_bias_is_malformed() {
        let no_conv = FakeArchive::default().with_layer("dense", Some(3));
        assert!(matches!(
            class_source_from_weights(&no_conv, path(), None),
            Err(ChannelConfigError::MalformedInput { .. })
        ));

        let no_bias = FakeArchive::default().with_layer("conv2d", None);
        assert!(matches!(
            class_source_from_weights(&no_bias, path(), None),
            Err(ChannelConfigError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_bad_embedded_descriptor_is_malformed() {
        let archive = FakeArchive {
            descriptor: Some(r#"{"resolution": "1mpp"}"#.to_string()),
            ..Default::default()
        };
        assert!(matches!(
            class_source_from_weights(&archive, path(), None),
            Err(ChannelConfigError::MalformedInput { .. })
        ));
    }
}
