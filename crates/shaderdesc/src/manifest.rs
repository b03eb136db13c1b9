//! TOML manifest describing one shader: its diagnostic name, the grammar file,
//! and the vertex fields the caller will bind.
//!
//! ```toml
//! name = "sprite"
//! source = "sprite.shd"
//!
//! [[inputs]]
//! name = "position"
//! format = "float3"
//!
//! [[inputs]]
//! name = "offset"
//! format = "float2"
//! per_instance = true
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout::{validate_inputs, VertexFieldDecl};

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid manifest: {0}")]
    Invalid(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShaderManifest {
    pub name: String,
    /// Grammar file; relative paths resolve against the manifest's directory.
    pub source: PathBuf,
    #[serde(default)]
    pub inputs: Vec<VertexFieldDecl>,
}

impl ShaderManifest {
    pub fn from_toml_str(input: &str) -> Result<Self, ManifestError> {
        let raw: ShaderManifest = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates a manifest file, anchoring `source` next to it.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::from_toml_str(&contents)?;
        if manifest.source.is_relative() {
            if let Some(dir) = path.parent() {
                manifest.source = dir.join(&manifest.source);
            }
        }
        Ok(manifest)
    }

    pub fn read_source(&self) -> Result<String, ManifestError> {
        fs::read_to_string(&self.source).map_err(|source| ManifestError::Io {
            path: self.source.clone(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::Invalid("name must not be empty".into()));
        }

        if self.source.as_os_str().is_empty() {
            return Err(ManifestError::Invalid(format!(
                "shader '{}' must name a source file",
                self.name
            )));
        }

        validate_inputs(&self.inputs)
            .map_err(|err| ManifestError::Invalid(format!("shader '{}': {err}", self.name)))?;

        Ok(())
    }
}
