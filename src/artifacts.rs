//! File-based stage artifacts.
//!
//! Each stage hands off through one pretty-printed JSON snapshot in the
//! output directory. Writes go through a temporary file in the same
//! directory and are persisted atomically, so a failed run never leaves a
//! half-written artifact behind.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: ArtifactKind,
        source: serde_json::Error,
    },
    #[error("{} is not a valid {kind} artifact: {source}", .path.display())]
    Decode {
        kind: ArtifactKind,
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The three hand-off artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Brief,
    Ideas,
    ScoredIdeas,
}

impl ArtifactKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Brief => "brand_brief.json",
            ArtifactKind::Ideas => "ideas.json",
            ArtifactKind::ScoredIdeas => "scored_ideas.json",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Brief => "brand brief",
            ArtifactKind::Ideas => "idea set",
            ArtifactKind::ScoredIdeas => "scored idea set",
        };
        f.write_str(name)
    }
}

/// Metadata about a written artifact
#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub bytes: usize,
    pub written_at: DateTime<Utc>,
}

/// Artifact directory, `outputs/` by default.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    pub fn exists(&self, kind: ArtifactKind) -> bool {
        self.path(kind).is_file()
    }

    /// Write `value` as the `kind` artifact, replacing any previous snapshot.
    pub fn save<T: Serialize>(&self, kind: ArtifactKind, value: &T) -> Result<ArtifactInfo, ArtifactError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ArtifactError::Io { path, source }
        };

        let mut body =
            serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Encode { kind, source })?;
        body.push('\n');

        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let path = self.path(kind);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err(&self.dir))?;
        tmp.write_all(body.as_bytes()).map_err(io_err(tmp.path()))?;
        tmp.as_file().sync_all().map_err(io_err(tmp.path()))?;
        tmp.persist(&path).map_err(|e| ArtifactError::Io {
            path: path.clone(),
            source: e.error,
        })?;

        tracing::info!(path = %path.display(), bytes = body.len(), "artifact written");
        Ok(ArtifactInfo {
            path,
            bytes: body.len(),
            written_at: Utc::now(),
        })
    }

    /// Read the `kind` artifact. Returns `Ok(None)` when it does not exist.
    pub fn load<T: DeserializeOwned>(&self, kind: ArtifactKind) -> Result<Option<T>, ArtifactError> {
        match self.load_value(kind)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| ArtifactError::Decode {
                    kind,
                    path: self.path(kind),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Read the `kind` artifact as untyped JSON.
    pub fn load_value(&self, kind: ArtifactKind) -> Result<Option<serde_json::Value>, ArtifactError> {
        let path = self.path(kind);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ArtifactError::Io { path, source }),
        };
        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|source| ArtifactError::Decode { kind, path, source })
    }
}
