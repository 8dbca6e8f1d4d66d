//! Ideas and the portfolio produced by the ideation stage.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::contract::{check_absolute_url, require_non_empty, Contract, Violation};

/// Minimum number of ideas a portfolio must hold.
pub const MIN_TOTAL_IDEAS: usize = 18;
/// Minimum number of ideas per category.
pub const MIN_PER_CATEGORY: usize = 3;

/// Closed category taxonomy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Category {
    Digital,
    Influencer,
    Events,
    Partnerships,
    #[serde(rename = "PR")]
    Pr,
    Community,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Digital,
        Category::Influencer,
        Category::Events,
        Category::Partnerships,
        Category::Pr,
        Category::Community,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Digital => "Digital",
            Category::Influencer => "Influencer",
            Category::Events => "Events",
            Category::Partnerships => "Partnerships",
            Category::Pr => "PR",
            Category::Community => "Community",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proposed marketing initiative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Idea {
    pub category: Category,
    /// Short title, at most twelve words
    pub title: String,
    /// Two to four sentences: hook, execution highlight, audience fit
    pub concept: String,
    /// Semicolon separated execution steps
    #[serde(default)]
    pub execution_notes: Option<String>,
    /// Fully qualified URLs backing researched claims; empty for evergreen ideas
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Idea {
    /// Checks the per-idea rules: non-empty text and unique absolute source URLs.
    pub fn check(&self) -> Result<(), Violation> {
        require_non_empty("title", &self.title)?;
        require_non_empty("concept", &self.concept)?;
        let mut seen = HashSet::new();
        for source in &self.sources {
            check_absolute_url(source)?;
            if !seen.insert(source.as_str()) {
                return Err(format!("source {source:?} is listed twice"));
            }
        }
        Ok(())
    }
}

/// Portfolio of categorized ideas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IdeaSet {
    /// A succinct paraphrase of the campaign goal
    pub campaign_intent: String,
    /// The brand name from the brief, verbatim
    pub brand_name: String,
    pub ideas: Vec<Idea>,
    /// Must equal the number of ideas
    #[schemars(range(min = 18))]
    pub total_ideas: usize,
}

impl IdeaSet {
    /// Number of ideas per category, including categories with none.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|&c| (c, 0)).collect();
        for idea in &self.ideas {
            *counts.entry(idea.category).or_default() += 1;
        }
        counts
    }
}

impl Contract for IdeaSet {
    fn validate(self) -> Result<Self, Violation> {
        require_non_empty("brand_name", &self.brand_name)?;
        if self.total_ideas != self.ideas.len() {
            return Err(format!(
                "total_ideas is {} but {} ideas were returned",
                self.total_ideas,
                self.ideas.len()
            ));
        }
        if self.ideas.len() < MIN_TOTAL_IDEAS {
            return Err(format!(
                "portfolio holds {} ideas, at least {MIN_TOTAL_IDEAS} are required",
                self.ideas.len()
            ));
        }
        let short: Vec<String> = self
            .category_counts()
            .into_iter()
            .filter(|&(_, n)| n < MIN_PER_CATEGORY)
            .map(|(c, n)| format!("{c} ({n})"))
            .collect();
        if !short.is_empty() {
            return Err(format!(
                "categories below {MIN_PER_CATEGORY} ideas: {}",
                short.join(", ")
            ));
        }
        for (index, idea) in self.ideas.iter().enumerate() {
            idea.check()
                .map_err(|e| format!("{}: {e}", crate::error::idea_label(index, &idea.title)))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn idea(category: Category, n: usize) -> Idea {
        Idea {
            category,
            title: format!("{category} idea {n}"),
            concept: format!("A {category} concept number {n}."),
            execution_notes: Some("Brief partners; launch; measure saves".to_owned()),
            sources: Vec::new(),
        }
    }

    /// A portfolio holding `per_category` ideas in each category.
    pub(crate) fn portfolio(brand: &str, per_category: usize) -> IdeaSet {
        let ideas: Vec<Idea> = Category::ALL
            .iter()
            .flat_map(|&c| (0..per_category).map(move |n| idea(c, n)))
            .collect();
        IdeaSet {
            campaign_intent: "Drive launch awareness".to_owned(),
            brand_name: brand.to_owned(),
            total_ideas: ideas.len(),
            ideas,
        }
    }
}
