//! Checksum utilities for generated artifacts

use sha2::{Digest, Sha256};
use std::fmt;

use crate::writer::ArtifactSet;

/// SHA256 checksum of artifact content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Self {
        let hash = Sha256::digest(content.as_bytes());
        Self(format!("{:x}", hash))
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `sha256sum`-compatible listing of every artifact, in name order
pub fn checksum_manifest(artifacts: &ArtifactSet) -> String {
    let mut out: String = artifacts
        .iter()
        .map(|a| format!("{}  {}", a.checksum(), a.name))
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Artifact;

    #[test]
    fn test_checksum_consistency() {
        let content = r#"{"type": "object"}"#;
        assert_eq!(Checksum::from_str(content), Checksum::from_str(content));
        assert_ne!(Checksum::from_str(content), Checksum::from_str("{}"));
    }

    #[test]
    fn test_checksum_is_sha256_hex() {
        assert_eq!(
            Checksum::from_str("abc").to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_manifest_lines() {
        let mut set = ArtifactSet::new();
        set.insert(Artifact::new("b.json", "{}"));
        set.insert(Artifact::new("a.json", "abc"));
        let manifest = checksum_manifest(&set);
        let lines: Vec<_> = manifest.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("  a.json"));
        assert!(lines[0].starts_with("ba7816bf"));
        assert!(lines[1].ends_with("  b.json"));
    }
}
