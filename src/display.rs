//! Terminal rendering of stage results.

use colored::Colorize;

use crate::brief::BrandBrief;
use crate::ideas::{Category, IdeaSet};
use crate::scores::{ScoredIdeaSet, ScoringStatus};

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "-".dimmed().to_string()
    } else {
        items.join(", ")
    }
}

pub fn print_brief(brief: &BrandBrief) {
    println!("{} {}", "Brand:".bold(), brief.brand_name.cyan().bold());
    println!("{} {}", "Goal:".bold(), brief.goal);
    println!("{} {}", "Values:".bold(), list(&brief.brand_values));

    match brief.constraints {
        Some(c) if brief.is_constrained() => {
            let budget = c.budget.map_or("-".to_owned(), |b| format!("{b:?}").to_lowercase());
            let timeline = c.timeline.map_or("-".to_owned(), |t| format!("{t:?}").to_lowercase());
            println!("{} budget {budget}, timeline {timeline}", "Constraints:".bold());
        }
        _ => println!("{} none stated", "Constraints:".bold()),
    }

    println!("\n{} ({})", "Audiences".bold(), brief.audiences.len());
    for audience in &brief.audiences {
        println!("\n  {}", audience.name.yellow().bold());
        println!("    Age: {}  Gender: {}", audience.age_group, audience.gender_distribution);
        println!("    Geography: {}  Income: {}", audience.geography, audience.income_level);
        println!("    Psychographics: {}", audience.psychographics);
        println!("    Behaviors: {}", list(&audience.behaviors));
        println!("    Pain points: {}", list(&audience.pain_points));
        println!("    Motivations: {}", list(&audience.motivations));
        println!("    Purchase drivers: {}", list(&audience.purchase_drivers));
        println!("    Channels: {}", list(&audience.preferred_channels));
    }
}

pub fn print_ideas(set: &IdeaSet) {
    println!(
        "{} {}: {} ideas",
        set.brand_name.cyan().bold(),
        set.campaign_intent,
        set.total_ideas
    );
    for category in Category::ALL {
        println!("\n{}", category.as_str().bold().underline());
        for idea in set.ideas.iter().filter(|i| i.category == category) {
            println!("  • {}", idea.title.bold());
            println!("    {}", idea.concept);
            if !idea.sources.is_empty() {
                println!("    {}", idea.sources.join(" ").dimmed());
            }
        }
    }
}

pub fn print_scored(set: &ScoredIdeaSet, top: usize) {
    println!(
        "{} {}: {} ideas scored",
        set.brand_name.cyan().bold(),
        set.campaign_intent,
        set.total_ideas
    );
    if let ScoringStatus::Partial { scored, total } = set.status() {
        println!("{}", format!("partial result: {scored} of {total} ideas scored").yellow());
    }

    println!("\n{}", "Top ideas".bold());
    for (rank, scored) in set.ranked().into_iter().take(top).enumerate() {
        let s = &scored.scores;
        println!(
            "{:>3}. {} [{}] {}",
            rank + 1,
            format!("{:.2}", s.mean()).green().bold(),
            scored.idea.category,
            scored.idea.title.bold()
        );
        println!(
            "     fit {:.2}  audience {:.2}  resonance {:.2}  virality {:.2}  feasibility {:.2}",
            s.brand_fit, s.audience, s.resonance, s.virality, s.feasibility
        );
        println!("     {}", s.rationale.dimmed());
    }

    println!("\n{}", "Best per category".bold());
    for category in Category::ALL {
        let best = set
            .ranked()
            .into_iter()
            .find(|s| s.idea.category == category);
        match best {
            Some(s) => println!("  {:<13} {:.2}  {}", category.as_str(), s.scores.mean(), s.idea.title),
            None => println!("  {:<13} {}", category.as_str(), "-".dimmed()),
        }
    }

    for failure in &set.failed {
        println!(
            "{} idea #{} \"{}\": {}",
            "failed".red().bold(),
            failure.index + 1,
            failure.title,
            failure.error
        );
    }
}
