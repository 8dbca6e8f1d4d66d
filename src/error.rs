//! Error taxonomy shared by the pipeline stages.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifacts::ArtifactError;
use crate::config::ConfigError;
use crate::dossier::DossierError;

/// One pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Extraction,
    Ideation,
    Scoring,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extraction => "extraction",
            Stage::Ideation => "ideation",
            Stage::Scoring => "scoring",
        };
        f.write_str(name)
    }
}

/// Failure of a single delegated call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvocationError {
    /// The response did not conform to the requested schema or its contract.
    #[error("schema violation: {0}")]
    SchemaViolation(String),
    /// The capability could not be reached, or did not answer in time.
    #[error("transport error: {0}")]
    Transport(String),
}

impl InvocationError {
    pub fn is_transient(&self) -> bool {
        matches!(self, InvocationError::Transport(_))
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("required input artifact is missing: {}", .path.display())]
    MissingArtifact { path: PathBuf },

    #[error("{stage} stage failed{}: {source}", record_suffix(.record))]
    Invocation {
        stage: Stage,
        record: Option<String>,
        source: InvocationError,
    },

    #[error("{stage} stage invariant violated{}: {reason}", record_suffix(.record))]
    Invariant {
        stage: Stage,
        record: Option<String>,
        reason: String,
    },

    #[error("{stage} stage exceeded its deadline of {after:?}")]
    DeadlineExceeded { stage: Stage, after: Duration },

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("dossier error: {0}")]
    Dossier(#[from] DossierError),
}

impl PipelineError {
    pub(crate) fn invocation(stage: Stage, record: Option<String>, source: InvocationError) -> Self {
        PipelineError::Invocation {
            stage,
            record,
            source,
        }
    }

    pub(crate) fn invariant(stage: Stage, record: Option<String>, reason: impl Into<String>) -> Self {
        PipelineError::Invariant {
            stage,
            record,
            reason: reason.into(),
        }
    }

    /// The stage that raised this error, when it came from a stage driver.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Invocation { stage, .. }
            | PipelineError::Invariant { stage, .. }
            | PipelineError::DeadlineExceeded { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

fn record_suffix(record: &Option<String>) -> String {
    match record {
        Some(label) => format!(" at {label}"),
        None => String::new(),
    }
}

/// Human readable label for an idea, used in error messages and failure markers.
pub(crate) fn idea_label(index: usize, title: &str) -> String {
    format!("idea #{} \"{}\"", index + 1, title)
}
