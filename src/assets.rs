//! JSON pattern asset library.
//!
//! Patterns are authored offline and persisted one JSON file per pattern,
//! addressed by name. Loading parses and then validates: a corrupted asset
//! whose keyframe tracks have desynchronized is rejected here with a
//! descriptive error instead of being partially evaluated at playback time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::curve::ValidationError;
use crate::pattern::HapticPattern;

/// Why a pattern asset operation failed.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("pattern {name:?} not found")]
    NotFound { name: String },
    #[error("pattern name {name:?} is not a plain file name")]
    InvalidName { name: String },
    #[error("failed to access pattern {name:?}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("pattern {name:?} is not valid JSON")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("pattern {name:?} failed validation")]
    Validation {
        name: String,
        #[source]
        source: ValidationError,
    },
}

/// Directory-backed store of named [`HapticPattern`] assets.
pub struct PatternLibrary {
    root: PathBuf,
}

impl PatternLibrary {
    /// Open (creating if needed) a library rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| AssetError::Io {
            name: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a pattern by name, rejecting assets that fail validation.
    pub fn load(&self, name: &str) -> Result<HapticPattern, AssetError> {
        let path = self.path_for(name)?;
        let bytes = fs::read(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                AssetError::NotFound {
                    name: name.to_string(),
                }
            } else {
                AssetError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })?;
        let pattern: HapticPattern =
            serde_json::from_slice(&bytes).map_err(|source| AssetError::Parse {
                name: name.to_string(),
                source,
            })?;
        pattern.validate().map_err(|source| AssetError::Validation {
            name: name.to_string(),
            source,
        })?;
        info!(name, curves = pattern.curve_count(), "loaded haptic pattern");
        Ok(pattern)
    }

    /// Save a pattern under `name`, overwriting any existing asset.
    pub fn save(&self, name: &str, pattern: &HapticPattern) -> Result<(), AssetError> {
        let path = self.path_for(name)?;
        let json =
            serde_json::to_vec_pretty(pattern).map_err(|source| AssetError::Parse {
                name: name.to_string(),
                source,
            })?;
        fs::write(&path, json).map_err(|source| AssetError::Io {
            name: name.to_string(),
            source,
        })?;
        info!(name, "saved haptic pattern");
        Ok(())
    }

    /// Delete the asset stored under `name`.
    pub fn delete(&self, name: &str) -> Result<(), AssetError> {
        let path = self.path_for(name)?;
        fs::remove_file(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                AssetError::NotFound {
                    name: name.to_string(),
                }
            } else {
                AssetError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }

    /// Rename an asset, overwriting any asset already stored under `new`.
    pub fn rename(&self, old: &str, new: &str) -> Result<(), AssetError> {
        let from = self.path_for(old)?;
        let to = self.path_for(new)?;
        if !from.exists() {
            return Err(AssetError::NotFound {
                name: old.to_string(),
            });
        }
        fs::rename(&from, &to).map_err(|source| AssetError::Io {
            name: old.to_string(),
            source,
        })
    }

    /// Names of every stored pattern, sorted.
    pub fn list(&self) -> Result<Vec<String>, AssetError> {
        let entries = fs::read_dir(&self.root).map_err(|source| AssetError::Io {
            name: self.root.display().to_string(),
            source,
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| AssetError::Io {
                name: self.root.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, AssetError> {
        if name.is_empty()
            || name.contains(['/', '\\'])
            || name == "."
            || name == ".."
        {
            return Err(AssetError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.root.join(format!("{name}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::SurfaceHit;
    use crate::curve::HapticCurve;
    use crate::pattern::{CollisionResolution, OvershootResolution, PlaybackTiming};

    fn temp_library(tag: &str) -> PatternLibrary {
        let dir = std::env::temp_dir().join(format!(
            "tacton-assets-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        PatternLibrary::open(dir).unwrap()
    }

    fn sweep_pattern() -> HapticPattern {
        let mut pattern = HapticPattern::new();
        pattern.collision_resolution = CollisionResolution::Max;
        pattern.timing = PlaybackTiming::Custom;
        pattern.custom_interval = 0.02;
        pattern.angle_overshoot = OvershootResolution::Wrap;
        let mut curve = HapticCurve::new();
        curve.add_keyframe(0.0, SurfaceHit::new(0.1, 0.0), 0.2);
        curve.add_keyframe(1.5, SurfaceHit::new(0.9, 350.0), 1.0);
        pattern.add_existing_curve(curve);
        pattern
    }

    #[test]
    fn test_save_load_round_trip() {
        let library = temp_library("roundtrip");
        let pattern = sweep_pattern();
        library.save("sweep", &pattern).unwrap();

        let loaded = library.load("sweep").unwrap();
        assert_eq!(loaded, pattern);

        let _ = fs::remove_dir_all(library.root());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let library = temp_library("missing");
        assert!(matches!(
            library.load("nope"),
            Err(AssetError::NotFound { .. })
        ));
        let _ = fs::remove_dir_all(library.root());
    }

    #[test]
    fn test_load_rejects_desynchronized_tracks() {
        let library = temp_library("invalid");
        // Height track has two keys, angle and intensity only one.
        let json = r#"{
            "curves": [{
                "height": { "keys": [
                    { "time": 0.0, "value": 0.1 },
                    { "time": 1.0, "value": 0.9 }
                ]},
                "angle": { "keys": [ { "time": 0.0, "value": 90.0 } ] },
                "intensity": { "keys": [ { "time": 0.0, "value": 1.0 } ] }
            }],
            "collision_resolution": "Average",
            "priority_curve": 0,
            "timing": "VariableRate",
            "custom_interval": 0.05,
            "height_overshoot": "Clamp",
            "angle_overshoot": "Clamp",
            "offset_mode": "Disabled"
        }"#;
        fs::write(library.root().join("broken.json"), json).unwrap();

        assert!(matches!(
            library.load("broken"),
            Err(AssetError::Validation { .. })
        ));
        let _ = fs::remove_dir_all(library.root());
    }

    #[test]
    fn test_delete_rename_list() {
        let library = temp_library("manage");
        let pattern = sweep_pattern();
        library.save("first", &pattern).unwrap();
        library.save("second", &pattern).unwrap();
        assert_eq!(library.list().unwrap(), vec!["first", "second"]);

        library.rename("first", "renamed").unwrap();
        assert_eq!(library.list().unwrap(), vec!["renamed", "second"]);

        library.delete("second").unwrap();
        assert_eq!(library.list().unwrap(), vec!["renamed"]);
        assert!(matches!(
            library.delete("second"),
            Err(AssetError::NotFound { .. })
        ));
        let _ = fs::remove_dir_all(library.root());
    }

    #[test]
    fn test_invalid_names_rejected() {
        let library = temp_library("names");
        assert!(matches!(
            library.load("../escape"),
            Err(AssetError::InvalidName { .. })
        ));
        assert!(matches!(
            library.save("", &HapticPattern::new()),
            Err(AssetError::InvalidName { .. })
        ));
        let _ = fs::remove_dir_all(library.root());
    }
}
