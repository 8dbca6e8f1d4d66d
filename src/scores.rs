//! Idea scores and the scored portfolio produced by the scoring stage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::contract::{require_non_empty, Contract, Violation};
use crate::ideas::Idea;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 5.0;

/// Five-dimension evaluation of one idea, each dimension 0.00 to 5.00.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IdeaScore {
    /// Alignment with values, tone, positioning and compliance (0.00-5.00, two decimals)
    #[schemars(range(min = 0.0, max = 5.0))]
    pub brand_fit: f64,
    /// Fit with target demographics and reachability (0.00-5.00, two decimals)
    #[schemars(range(min = 0.0, max = 5.0))]
    pub audience: f64,
    /// Cultural timing, novelty and emotional pull (0.00-5.00, two decimals)
    #[schemars(range(min = 0.0, max = 5.0))]
    pub resonance: f64,
    /// Organic share likelihood (0.00-5.00, two decimals)
    #[schemars(range(min = 0.0, max = 5.0))]
    pub virality: f64,
    /// Cost, timeline and operational risk given constraints (0.00-5.00, two decimals)
    #[schemars(range(min = 0.0, max = 5.0))]
    pub feasibility: f64,
    /// One concise sentence naming the main tradeoff
    pub rationale: String,
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check_dimension(name: &str, value: f64) -> Result<f64, Violation> {
    if !value.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(format!(
            "{name} is {value}, expected a value between {MIN_SCORE:.2} and {MAX_SCORE:.2}"
        ));
    }
    Ok(round2(value))
}

impl IdeaScore {
    pub fn dimensions(&self) -> [(&'static str, f64); 5] {
        [
            ("brand_fit", self.brand_fit),
            ("audience", self.audience),
            ("resonance", self.resonance),
            ("virality", self.virality),
            ("feasibility", self.feasibility),
        ]
    }

    /// Unweighted mean of the five dimensions.
    pub fn mean(&self) -> f64 {
        self.dimensions().iter().map(|(_, v)| v).sum::<f64>() / 5.0
    }
}

impl Contract for IdeaScore {
    fn validate(self) -> Result<Self, Violation> {
        require_non_empty("rationale", &self.rationale)?;
        Ok(IdeaScore {
            brand_fit: check_dimension("brand_fit", self.brand_fit)?,
            audience: check_dimension("audience", self.audience)?,
            resonance: check_dimension("resonance", self.resonance)?,
            virality: check_dimension("virality", self.virality)?,
            feasibility: check_dimension("feasibility", self.feasibility)?,
            rationale: self.rationale,
        })
    }
}

/// An idea with its score attached under `scores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredIdea {
    #[serde(flatten)]
    pub idea: Idea,
    pub scores: IdeaScore,
}

/// Marker for an idea that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFailure {
    /// Zero-based position in the input portfolio
    pub index: usize,
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredIdeaSet {
    pub campaign_intent: String,
    pub brand_name: String,
    /// Number of ideas actually scored
    pub total_ideas: usize,
    pub ideas: Vec<ScoredIdea>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<ScoreFailure>,
}

/// Outcome of a scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringStatus {
    Complete,
    Partial { scored: usize, total: usize },
}

impl ScoredIdeaSet {
    pub fn status(&self) -> ScoringStatus {
        if self.failed.is_empty() {
            ScoringStatus::Complete
        } else {
            ScoringStatus::Partial {
                scored: self.ideas.len(),
                total: self.ideas.len() + self.failed.len(),
            }
        }
    }

    /// Scored ideas ordered by mean score, best first. Ties keep input order.
    pub fn ranked(&self) -> Vec<&ScoredIdea> {
        let mut ranked: Vec<&ScoredIdea> = self.ideas.iter().collect();
        ranked.sort_by(|a, b| b.scores.mean().total_cmp(&a.scores.mean()));
        ranked
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn score(value: f64) -> IdeaScore {
        IdeaScore {
            brand_fit: value,
            audience: value,
            resonance: value,
            virality: value,
            feasibility: value,
            rationale: "Strong fit, modest reach.".to_owned(),
        }
    }
}
