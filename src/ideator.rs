//! Stage 2: BrandBrief -> IdeaSet.

use crate::agent::Agent;
use crate::brief::BrandBrief;
use crate::error::{PipelineError, Stage};
use crate::ideas::IdeaSet;
use crate::prompts;
use crate::retry::{call, CallPolicy};

/// At most `limit` characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn build_prompt(brief: &BrandBrief, dossier_excerpt: Option<&str>) -> Result<String, PipelineError> {
    let brief_json = serde_json::to_string_pretty(brief)
        .map_err(|e| PipelineError::invariant(Stage::Ideation, None, e.to_string()))?;
    let mut prompt = format!("{}\n\nBRAND BRIEF (JSON):\n{brief_json}", prompts::IDEATION);
    if let Some(text) = dossier_excerpt.filter(|t| !t.trim().is_empty()) {
        prompt.push_str("\n\nSELECTED DOSSIER EXCERPT:\n");
        prompt.push_str(text);
    }
    prompt.push_str("\n\nCAMPAIGN GOAL:\n");
    prompt.push_str(&brief.goal);
    prompt.push_str("\n\nGenerate the idea portfolio now.");
    Ok(prompt)
}

/// Generate a portfolio for `brief`, optionally enriched with raw dossier text.
///
/// The dossier is truncated to `excerpt_chars` characters. The returned set
/// has passed the portfolio contract and echoes the brief's brand name.
pub async fn generate_ideas(
    agent: &dyn Agent,
    brief: &BrandBrief,
    dossier: Option<&str>,
    excerpt_chars: usize,
    policy: CallPolicy,
) -> Result<IdeaSet, PipelineError> {
    let prompt = build_prompt(brief, dossier.map(|d| excerpt(d, excerpt_chars)))?;
    tracing::info!(brand = %brief.brand_name, "generating idea portfolio");

    let set: IdeaSet = call(agent, &prompt, policy)
        .await
        .map_err(|e| PipelineError::invocation(Stage::Ideation, None, e))?;

    if set.brand_name != brief.brand_name {
        return Err(PipelineError::invariant(
            Stage::Ideation,
            None,
            format!(
                "brand_name {:?} does not echo the brief's {:?}",
                set.brand_name, brief.brand_name
            ),
        ));
    }

    tracing::info!(total = set.total_ideas, "idea portfolio generated");
    Ok(set)
}
