//! Artifact destinations

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::writer::{Artifact, ArtifactSet};

/// Somewhere generated artifacts can be stored
pub trait ArtifactSink {
    fn put(&mut self, artifact: &Artifact) -> Result<()>;

    /// Store every artifact of a set, in name order
    fn put_all(&mut self, artifacts: &ArtifactSet) -> Result<()> {
        for artifact in artifacts.iter() {
            self.put(&artifact)?;
        }
        Ok(())
    }
}

/// Writes artifacts as files in one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create the sink, creating the directory if needed
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

impl ArtifactSink for DirectorySink {
    fn put(&mut self, artifact: &Artifact) -> Result<()> {
        let path = self.root.join(&artifact.name);
        debug!(path = %path.display(), bytes = artifact.content.len(), "writing artifact");
        fs::write(path, &artifact.content)?;
        Ok(())
    }
}

/// Keeps artifacts in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: BTreeMap<String, String>,
}

impl ArtifactSink for MemorySink {
    fn put(&mut self, artifact: &Artifact) -> Result<()> {
        self.files.insert(artifact.name.clone(), artifact.content.clone());
        Ok(())
    }
}
