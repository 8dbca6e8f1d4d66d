//! Stage 1: dossier + campaign goal -> BrandBrief.

use crate::agent::Agent;
use crate::brief::BrandBrief;
use crate::error::{PipelineError, Stage};
use crate::prompts;
use crate::retry::{call, CallPolicy};

/// Delimiter that introduces the campaign goal after the dossier text.
pub const GOAL_DELIMITER: &str = "CAMPAIGN GOAL: ";

/// Appends the campaign goal to the dossier.
pub fn compose_context(dossier: &str, goal: &str) -> String {
    format!("{}\n\n{GOAL_DELIMITER}{}\n", dossier.trim_end(), goal.trim())
}

fn build_prompt(dossier: &str, goal: &str) -> String {
    format!(
        "{}\n\n---\n\n{}",
        prompts::EXTRACTION,
        compose_context(dossier, goal)
    )
}

/// Extract a validated brief from `dossier`.
///
/// The brief's `goal` always carries the supplied `goal`, even when the
/// model paraphrased it.
pub async fn extract_brief(
    agent: &dyn Agent,
    dossier: &str,
    goal: &str,
    policy: CallPolicy,
) -> Result<BrandBrief, PipelineError> {
    if dossier.trim().is_empty() {
        return Err(PipelineError::invariant(
            Stage::Extraction,
            None,
            "dossier text is empty",
        ));
    }
    if goal.trim().is_empty() {
        return Err(PipelineError::invariant(
            Stage::Extraction,
            None,
            "campaign goal is empty",
        ));
    }

    tracing::info!(dossier_chars = dossier.chars().count(), "extracting brand brief");
    let prompt = build_prompt(dossier, goal);
    let mut brief: BrandBrief = call(agent, &prompt, policy)
        .await
        .map_err(|e| PipelineError::invocation(Stage::Extraction, None, e))?;

    if brief.goal.trim() != goal.trim() {
        tracing::warn!(
            returned = %brief.goal,
            supplied = goal.trim(),
            "brief goal differs from the campaign goal, keeping the supplied goal"
        );
        brief.goal = goal.trim().to_owned();
    }

    tracing::info!(
        brand = %brief.brand_name,
        values = brief.brand_values.len(),
        audiences = brief.audiences.len(),
        "brand brief extracted"
    );
    Ok(brief)
}
