//! # Ideaforge
//!
//! A three-stage marketing pipeline driven by LLM structured output.
//!
//! ## Stages
//!
//! - **Extraction**: dossier text + campaign goal -> [`BrandBrief`]
//! - **Ideation**: brief -> [`IdeaSet`], at least 18 ideas across 6 categories
//! - **Scoring**: brief + ideas -> [`ScoredIdeaSet`], five dimensions per idea
//!
//! Stages hand off through JSON artifacts in the output directory. Every
//! model answer is decoded into a typed value and re-checked against its
//! [`Contract`] before it is persisted.

pub mod agent;
pub mod artifacts;
pub mod brief;
pub mod config;
pub mod contract;
pub mod display;
pub mod dossier;
pub mod error;
pub mod extractor;
pub mod ideas;
pub mod ideator;
pub mod pipeline;
pub mod prompts;
pub mod retry;
pub mod scorer;
pub mod scores;

pub use agent::{invoke, Agent, GeminiAgent};
pub use artifacts::{ArtifactKind, ArtifactStore};
pub use brief::{Audience, BrandBrief, Budget, Constraints, Timeline};
pub use config::Config;
pub use contract::{Contract, SchemaDescriptor};
pub use error::{InvocationError, PipelineError, Stage};
pub use ideas::{Category, Idea, IdeaSet};
pub use pipeline::Pipeline;
pub use scores::{IdeaScore, ScoredIdea, ScoredIdeaSet, ScoringStatus};
