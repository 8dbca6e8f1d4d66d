//! Stage orchestration.
//!
//! [`Pipeline`] owns the injected [`Agent`], the configuration and the
//! artifact store. Each stage reads its input artifact, runs its driver, and
//! writes exactly one output artifact only when the driver succeeded.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::agent::Agent;
use crate::artifacts::{ArtifactError, ArtifactKind, ArtifactStore};
use crate::brief::BrandBrief;
use crate::config::Config;
use crate::contract::{require_non_empty, Contract};
use crate::error::{idea_label, PipelineError, Stage};
use crate::ideas::IdeaSet;
use crate::scores::ScoredIdeaSet;
use crate::scorer::ScoringOptions;
use crate::{extractor, ideator, scorer};

/// Artifacts produced by an end-to-end run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub brief: BrandBrief,
    pub ideas: IdeaSet,
    pub scored: ScoredIdeaSet,
}

pub struct Pipeline {
    agent: Arc<dyn Agent>,
    config: Config,
    store: ArtifactStore,
}

impl Pipeline {
    /// Build a pipeline writing to the configured output directory.
    pub fn new(agent: Arc<dyn Agent>, config: Config) -> Self {
        let store = ArtifactStore::new(&config.output.dir);
        Self {
            agent,
            config,
            store,
        }
    }

    pub fn with_store(mut self, store: ArtifactStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn within_deadline<T, F>(&self, stage: Stage, fut: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        match self.config.stage_deadline() {
            Some(after) => tokio::time::timeout(after, fut)
                .await
                .map_err(|_| PipelineError::DeadlineExceeded { stage, after })?,
            None => fut.await,
        }
    }

    fn require<T: serde::de::DeserializeOwned>(&self, kind: ArtifactKind) -> Result<T, PipelineError> {
        self.store
            .load(kind)?
            .ok_or_else(|| PipelineError::MissingArtifact {
                path: self.store.path(kind),
            })
    }

    /// Reads `brand_brief.json` and re-runs the brief checks on it.
    fn load_brief(&self, stage: Stage) -> Result<BrandBrief, PipelineError> {
        let brief: BrandBrief = self.require(ArtifactKind::Brief)?;
        brief.validate().map_err(|reason| {
            let path = self.store.path(ArtifactKind::Brief);
            PipelineError::invariant(stage, None, format!("{}: {reason}", path.display()))
        })
    }

    /// Stage 1: extract the brief and write `brand_brief.json`.
    pub async fn extract(&self, dossier: &str, goal: &str) -> Result<BrandBrief, PipelineError> {
        let policy = self.config.call_policy();
        let brief = self
            .within_deadline(
                Stage::Extraction,
                extractor::extract_brief(self.agent.as_ref(), dossier, goal, policy),
            )
            .await?;
        self.store.save(ArtifactKind::Brief, &brief)?;
        Ok(brief)
    }

    /// Stage 2: read `brand_brief.json`, generate ideas and write `ideas.json`.
    pub async fn ideate(&self, dossier: Option<&str>) -> Result<IdeaSet, PipelineError> {
        let brief = self.load_brief(Stage::Ideation)?;
        self.ideate_from(&brief, dossier).await
    }

    async fn ideate_from(&self, brief: &BrandBrief, dossier: Option<&str>) -> Result<IdeaSet, PipelineError> {
        let policy = self.config.call_policy();
        let excerpt_chars = self.config.pipeline.dossier_excerpt_chars;
        let ideas = self
            .within_deadline(
                Stage::Ideation,
                ideator::generate_ideas(self.agent.as_ref(), brief, dossier, excerpt_chars, policy),
            )
            .await?;
        self.store.save(ArtifactKind::Ideas, &ideas)?;
        Ok(ideas)
    }

    /// Stage 3: read both upstream artifacts, score and write `scored_ideas.json`.
    pub async fn score(&self) -> Result<ScoredIdeaSet, PipelineError> {
        self.score_with(self.config.scoring_options()).await
    }

    pub async fn score_with(&self, options: ScoringOptions) -> Result<ScoredIdeaSet, PipelineError> {
        let brief = self.load_brief(Stage::Scoring)?;
        let ideas = self.load_idea_set()?;
        self.score_from(&brief, &ideas, options).await
    }

    async fn score_from(
        &self,
        brief: &BrandBrief,
        ideas: &IdeaSet,
        options: ScoringOptions,
    ) -> Result<ScoredIdeaSet, PipelineError> {
        let scored = self
            .within_deadline(
                Stage::Scoring,
                scorer::score_ideas(self.agent.as_ref(), brief, ideas, options),
            )
            .await?;
        self.store.save(ArtifactKind::ScoredIdeas, &scored)?;
        Ok(scored)
    }

    /// Reads `ideas.json`, failing fast when it holds no ideas or a record
    /// that would not have passed ideation. Portfolio quotas are not re-checked.
    fn load_idea_set(&self) -> Result<IdeaSet, PipelineError> {
        let kind = ArtifactKind::Ideas;
        let path = self.store.path(kind);
        let value = self
            .store
            .load_value(kind)?
            .ok_or_else(|| PipelineError::MissingArtifact { path: path.clone() })?;
        let invariant = |record: Option<String>, reason: String| {
            PipelineError::invariant(Stage::Scoring, record, format!("{}: {reason}", path.display()))
        };

        let has_ideas = matches!(value.get("ideas"), Some(Value::Array(items)) if !items.is_empty());
        if !has_ideas {
            return Err(invariant(None, "no ideas found under key 'ideas'".to_owned()));
        }

        let set: IdeaSet = serde_json::from_value(value).map_err(|source| {
            PipelineError::Artifact(ArtifactError::Decode {
                kind,
                path: path.clone(),
                source,
            })
        })?;

        require_non_empty("brand_name", &set.brand_name).map_err(|e| invariant(None, e))?;
        if set.total_ideas != set.ideas.len() {
            return Err(invariant(
                None,
                format!(
                    "total_ideas is {} but the file holds {} ideas",
                    set.total_ideas,
                    set.ideas.len()
                ),
            ));
        }
        for (index, idea) in set.ideas.iter().enumerate() {
            idea.check()
                .map_err(|e| invariant(Some(idea_label(index, &idea.title)), e))?;
        }
        Ok(set)
    }

    /// Run all three stages in order.
    pub async fn run(&self, dossier: &str, goal: &str) -> Result<RunOutput, PipelineError> {
        let brief = self.extract(dossier, goal).await?;
        let ideas = self.ideate_from(&brief, Some(dossier)).await?;
        let scored = self
            .score_from(&brief, &ideas, self.config.scoring_options())
            .await?;
        Ok(RunOutput {
            brief,
            ideas,
            scored,
        })
    }
}
