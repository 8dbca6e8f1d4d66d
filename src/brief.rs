//! BrandBrief - the structured output of the extraction stage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::contract::{require_non_empty, Contract, Violation};

/// Structured summary of brand identity, audiences, goal and constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BrandBrief {
    /// Exact brand name as written in the dossier
    pub brand_name: String,
    /// Three to six brand values explicitly mentioned in the dossier
    pub brand_values: Vec<String>,
    /// One record per audience segment described in the dossier
    pub audiences: Vec<Audience>,
    /// The campaign goal, copied verbatim
    pub goal: String,
    /// Budget and timeline, only when stated explicitly
    #[serde(default)]
    pub constraints: Option<Constraints>,
}

/// One audience segment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Audience {
    pub name: String,
    pub age_group: String,
    pub gender_distribution: String,
    pub geography: String,
    pub income_level: String,
    #[serde(alias = "psycographics")]
    pub psychographics: String,
    pub behaviors: Vec<String>,
    pub pain_points: Vec<String>,
    pub motivations: Vec<String>,
    pub purchase_drivers: Vec<String>,
    pub preferred_channels: Vec<String>,
}

/// Stated campaign constraints. An absent field means no constraint was asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Constraints {
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub timeline: Option<Timeline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Timeline {
    Short,
    Long,
}

impl BrandBrief {
    /// True when the brief asserts any budget or timeline constraint.
    pub fn is_constrained(&self) -> bool {
        self.constraints
            .is_some_and(|c| c.budget.is_some() || c.timeline.is_some())
    }
}

impl Contract for BrandBrief {
    fn validate(self) -> Result<Self, Violation> {
        require_non_empty("brand_name", &self.brand_name)?;
        if self.brand_values.iter().any(|v| v.trim().is_empty()) {
            return Err("brand_values must not contain empty entries".to_owned());
        }
        if !(3..=6).contains(&self.brand_values.len()) {
            tracing::warn!(
                count = self.brand_values.len(),
                "brief carries an unusual number of brand values"
            );
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn brief_json() -> serde_json::Value {
        json!({
            "brand_name": "Acme",
            "brand_values": ["quality", "trust", "craft"],
            "audiences": [{
                "name": "Weekend makers",
                "age_group": "25-40",
                "gender_distribution": "mixed",
                "geography": "US",
                "income_level": "middle",
                "psycographics": "hands-on, thrifty",
                "behaviors": ["DIY projects"],
                "pain_points": ["tools break"],
                "motivations": ["pride in work"],
                "purchase_drivers": ["durability"],
                "preferred_channels": ["YouTube"]
            }],
            "goal": "Launch Q1",
            "constraints": null
        })
    }

    #[test]
    fn decodes_legacy_psychographics_spelling() {
        let brief: BrandBrief = serde_json::from_value(brief_json()).unwrap();
        assert_eq!(brief.audiences[0].psychographics, "hands-on, thrifty");
        assert!(brief.constraints.is_none());
        assert!(!brief.is_constrained());
    }

    #[test]
    fn missing_constraints_key_means_unconstrained() {
        let mut value = brief_json();
        value.as_object_mut().unwrap().remove("constraints");
        let brief: BrandBrief = serde_json::from_value(value).unwrap();
        assert_eq!(brief.constraints, None);
    }

    #[test]
    fn constraint_enums_are_lowercase() {
        let mut value = brief_json();
        value["constraints"] = json!({ "budget": "low", "timeline": null });
        let brief: BrandBrief = serde_json::from_value(value).unwrap();
        assert_eq!(brief.constraints.unwrap().budget, Some(Budget::Low));
        assert!(brief.is_constrained());

        let mut bad = brief_json();
        bad["constraints"] = json!({ "budget": "huge" });
        assert!(serde_json::from_value::<BrandBrief>(bad).is_err());
    }

    #[test]
    fn empty_brand_name_is_rejected() {
        let mut value = brief_json();
        value["brand_name"] = json!("  ");
        let brief: BrandBrief = serde_json::from_value(value).unwrap();
        assert!(brief.validate().is_err());
    }

    #[test]
    fn re_encoding_is_loss_free() {
        let brief: BrandBrief = serde_json::from_value(brief_json()).unwrap();
        let encoded = serde_json::to_string_pretty(&brief).unwrap();
        let decoded: BrandBrief = serde_json::from_str(&encoded).unwrap();
        pretty_assertions::assert_eq!(brief, decoded);
    }
}
