//! Stage 3: (BrandBrief, IdeaSet) -> ScoredIdeaSet.
//!
//! Ideas are scored one call each. With `concurrency > 1` up to that many
//! calls are in flight, but results are always assembled in input order.

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::agent::Agent;
use crate::brief::BrandBrief;
use crate::error::{idea_label, InvocationError, PipelineError, Stage};
use crate::ideas::{Category, Idea, IdeaSet};
use crate::prompts;
use crate::retry::{call, CallPolicy};
use crate::scores::{IdeaScore, ScoreFailure, ScoredIdea, ScoredIdeaSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringOptions {
    /// Maximum number of scoring calls in flight.
    pub concurrency: usize,
    /// Record per-idea failures and continue instead of aborting the stage.
    pub keep_going: bool,
    pub policy: CallPolicy,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            keep_going: false,
            policy: CallPolicy::default(),
        }
    }
}

/// The fields of an idea the scorer is allowed to see.
#[derive(Serialize)]
struct IdeaView<'a> {
    category: Category,
    title: &'a str,
    concept: &'a str,
    execution_notes: Option<&'a str>,
    sources: &'a [String],
}

impl<'a> From<&'a Idea> for IdeaView<'a> {
    fn from(idea: &'a Idea) -> Self {
        Self {
            category: idea.category,
            title: &idea.title,
            concept: &idea.concept,
            execution_notes: idea.execution_notes.as_deref(),
            sources: &idea.sources,
        }
    }
}

fn build_prompt(brief_json: &str, idea: &Idea) -> String {
    let idea_json = serde_json::to_string_pretty(&IdeaView::from(idea))
        .unwrap_or_else(|_| format!("{{\"title\": {:?}}}", idea.title));
    format!(
        "{}\n\nBRAND_BRIEF (JSON):\n{brief_json}\n\nIDEA (JSON):\n{idea_json}\n\nReturn IdeaScore JSON only.",
        prompts::SCORING
    )
}

async fn score_one(
    agent: &dyn Agent,
    brief_json: &str,
    idea: &Idea,
    policy: CallPolicy,
) -> Result<IdeaScore, InvocationError> {
    let prompt = build_prompt(brief_json, idea);
    call(agent, &prompt, policy).await
}

/// Score every idea of `set` against `brief`.
pub async fn score_ideas(
    agent: &dyn Agent,
    brief: &BrandBrief,
    set: &IdeaSet,
    options: ScoringOptions,
) -> Result<ScoredIdeaSet, PipelineError> {
    if set.ideas.is_empty() {
        return Err(PipelineError::invariant(
            Stage::Scoring,
            None,
            "idea set contains no ideas",
        ));
    }
    if set.brand_name != brief.brand_name {
        return Err(PipelineError::invariant(
            Stage::Scoring,
            None,
            format!(
                "idea set brand {:?} does not match brief brand {:?}",
                set.brand_name, brief.brand_name
            ),
        ));
    }

    let brief_json = serde_json::to_string_pretty(brief)
        .map_err(|e| PipelineError::invariant(Stage::Scoring, None, e.to_string()))?;
    let brief_json = brief_json.as_str();
    let policy = options.policy;
    let total = set.ideas.len();
    tracing::info!(total, concurrency = options.concurrency, "scoring ideas");

    let mut results = stream::iter(set.ideas.iter().enumerate())
        .map(move |(index, idea)| async move {
            tracing::debug!(index, title = %idea.title, "scoring idea");
            (index, score_one(agent, brief_json, idea, policy).await)
        })
        .buffered(options.concurrency.max(1));

    let mut scored = Vec::with_capacity(total);
    let mut failed = Vec::new();
    while let Some((index, outcome)) = results.next().await {
        let idea = &set.ideas[index];
        match outcome {
            Ok(scores) => scored.push(ScoredIdea {
                idea: idea.clone(),
                scores,
            }),
            Err(e) if options.keep_going => {
                tracing::warn!(index, title = %idea.title, error = %e, "idea could not be scored");
                failed.push(ScoreFailure {
                    index,
                    title: idea.title.clone(),
                    error: e.to_string(),
                });
            }
            Err(e) => {
                return Err(PipelineError::invocation(
                    Stage::Scoring,
                    Some(idea_label(index, &idea.title)),
                    e,
                ))
            }
        }
    }

    if scored.is_empty() {
        return Err(PipelineError::invariant(
            Stage::Scoring,
            None,
            format!("none of the {total} ideas could be scored"),
        ));
    }

    tracing::info!(scored = scored.len(), failed = failed.len(), "scoring finished");
    Ok(ScoredIdeaSet {
        campaign_intent: set.campaign_intent.clone(),
        brand_name: set.brand_name.clone(),
        total_ideas: scored.len(),
        ideas: scored,
        failed,
    })
}
