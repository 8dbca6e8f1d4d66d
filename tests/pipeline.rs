//! End-to-end pipeline tests using a deterministic stub agent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ideaforge::{
    Agent, ArtifactKind, BrandBrief, Category, Config, IdeaSet, InvocationError, Pipeline,
    PipelineError, SchemaDescriptor, ScoredIdeaSet, Stage,
};
use serde_json::{json, Value};
use tempfile::TempDir;

const DOSSIER: &str = "Acme is a tool maker from Ohio. Its values are quality and trust. \
                       Acme serves weekend makers and professional carpenters.";

/// Answers by schema name, like a well-behaved model would.
struct StubAgent {
    brand: String,
    per_category: usize,
    score_calls: AtomicUsize,
    delay: Duration,
}

impl StubAgent {
    fn new(brand: &str) -> Self {
        Self {
            brand: brand.to_owned(),
            per_category: 3,
            score_calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    fn brief(&self, prompt: &str) -> Value {
        let goal = prompt
            .rsplit("CAMPAIGN GOAL: ")
            .next()
            .unwrap_or_default()
            .trim();
        json!({
            "brand_name": self.brand,
            "brand_values": ["quality", "trust"],
            "audiences": [{
                "name": "Weekend makers",
                "age_group": "25-45",
                "gender_distribution": "60% male",
                "geography": "US Midwest",
                "income_level": "middle",
                "psychographics": "practical, proud of their work",
                "behaviors": ["weekend DIY"],
                "pain_points": ["cheap tools fail"],
                "motivations": ["craft"],
                "purchase_drivers": ["durability"],
                "preferred_channels": ["YouTube", "Instagram"]
            }],
            "goal": goal,
            "constraints": { "budget": "medium", "timeline": null }
        })
    }

    fn ideas(&self) -> Value {
        let ideas: Vec<Value> = Category::ALL
            .iter()
            .flat_map(|c| {
                (0..self.per_category).map(move |n| {
                    let sources: Vec<&str> = if n == 0 {
                        vec!["https://example.com/research"]
                    } else {
                        Vec::new()
                    };
                    json!({
                        "category": c,
                        "title": format!("{c} play {n}"),
                        "concept": format!("A {c} concept built around makers, number {n}."),
                        "execution_notes": "Brief; launch; measure",
                        "sources": sources
                    })
                })
            })
            .collect();
        json!({
            "campaign_intent": "Launch awareness in Q1",
            "brand_name": self.brand,
            "total_ideas": ideas.len(),
            "ideas": ideas
        })
    }

    fn score(&self) -> Value {
        let n = self.score_calls.fetch_add(1, Ordering::SeqCst);
        let value = 2.0 + (n % 4) as f64 * 0.755;
        json!({
            "brand_fit": value, "audience": 3.0, "resonance": 3.0,
            "virality": 2.5, "feasibility": 4.0,
            "rationale": "Clear hook with modest reach."
        })
    }
}

#[async_trait]
impl Agent for StubAgent {
    async fn complete(
        &self,
        prompt: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Value, InvocationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match schema.name.as_str() {
            "BrandBrief" => Ok(self.brief(prompt)),
            "IdeaSet" => Ok(self.ideas()),
            "IdeaScore" => Ok(self.score()),
            other => Err(InvocationError::SchemaViolation(format!("unexpected schema {other}"))),
        }
    }
}

fn pipeline(agent: StubAgent, dir: &TempDir) -> Pipeline {
    let mut config = Config::default();
    config.output.dir = dir.path().join("outputs");
    config.pipeline.backoff_base_ms = 0;
    Pipeline::new(Arc::new(agent), config)
}

fn read_json(pipeline: &Pipeline, kind: ArtifactKind) -> Value {
    let text = std::fs::read_to_string(pipeline.store().path(kind)).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn extraction_writes_brief() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);

    let brief = pipeline.extract(DOSSIER, "Launch Q1").await.unwrap();
    assert_eq!(brief.brand_name, "Acme");
    assert_eq!(brief.goal, "Launch Q1");
    assert!(brief.brand_values.iter().any(|v| v == "quality"));
    assert!(brief.brand_values.iter().any(|v| v == "trust"));

    let stored: BrandBrief = pipeline.store().load(ArtifactKind::Brief).unwrap().unwrap();
    assert_eq!(stored, brief);
}

#[tokio::test]
async fn ideation_echoes_brand_from_stored_brief() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);
    pipeline.extract(DOSSIER, "Launch Q1").await.unwrap();

    let ideas = pipeline.ideate(Some(DOSSIER)).await.unwrap();
    assert_eq!(ideas.brand_name, "Acme");
    assert!(ideas.ideas.len() >= 18);
    assert_eq!(ideas.total_ideas, ideas.ideas.len());
    for (category, count) in ideas.category_counts() {
        assert!(count >= 3, "{category} has {count} ideas");
    }
    assert!(pipeline.store().exists(ArtifactKind::Ideas));
}

#[tokio::test]
async fn ideation_without_brief_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);
    let err = pipeline.ideate(None).await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingArtifact { .. }), "{err}");
}

#[tokio::test]
async fn under_quota_portfolio_writes_no_artifact() {
    let dir = TempDir::new().unwrap();
    let mut agent = StubAgent::new("Acme");
    agent.per_category = 2;
    let pipeline = pipeline(agent, &dir);
    pipeline.extract(DOSSIER, "Launch Q1").await.unwrap();

    let err = pipeline.ideate(None).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Ideation));
    assert!(!pipeline.store().exists(ArtifactKind::Ideas));
}

#[tokio::test]
async fn scoring_attaches_one_score_per_idea() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);
    pipeline.extract(DOSSIER, "Launch Q1").await.unwrap();
    let ideas = pipeline.ideate(None).await.unwrap();
    assert_eq!(ideas.ideas.len(), 18);

    let scored = pipeline.score().await.unwrap();
    assert_eq!(scored.total_ideas, 18);
    assert_eq!(scored.ideas.len(), 18);
    for (input, output) in ideas.ideas.iter().zip(&scored.ideas) {
        assert_eq!(output.idea.category, input.category);
        assert_eq!(output.idea.title, input.title);
        assert_eq!(output.idea.concept, input.concept);
        for (name, value) in output.scores.dimensions() {
            assert!((0.0..=5.0).contains(&value), "{name} = {value}");
            assert_eq!((value * 100.0).round() / 100.0, value, "{name} not rounded");
        }
    }

    let raw = read_json(&pipeline, ArtifactKind::ScoredIdeas);
    let first = &raw["ideas"][0];
    for key in ["brand_fit", "audience", "resonance", "virality", "feasibility", "rationale"] {
        assert!(first["scores"].get(key).is_some(), "missing {key}");
    }
    assert!(raw.get("failed").is_none());
}

async fn seed_ideas_file(pipeline: &Pipeline, body: Value) {
    pipeline.extract(DOSSIER, "Launch Q1").await.unwrap();
    let path = pipeline.store().path(ArtifactKind::Ideas);
    std::fs::write(path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
}

#[tokio::test]
async fn scoring_without_ideas_key_fails_fast() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);
    seed_ideas_file(
        &pipeline,
        json!({ "campaign_intent": "Launch", "brand_name": "Acme", "total_ideas": 0 }),
    )
    .await;

    let err = pipeline.score().await.unwrap_err();
    assert!(
        matches!(err, PipelineError::Invariant { stage: Stage::Scoring, .. }),
        "{err}"
    );
    assert!(!pipeline.store().exists(ArtifactKind::ScoredIdeas));
}

#[tokio::test]
async fn scoring_with_empty_ideas_fails_fast() {
    let dir = TempDir::new().unwrap();
    let agent = StubAgent::new("Acme");
    let pipeline = pipeline(agent, &dir);
    seed_ideas_file(
        &pipeline,
        json!({ "campaign_intent": "Launch", "brand_name": "Acme", "total_ideas": 0, "ideas": [] }),
    )
    .await;

    assert!(pipeline.score().await.is_err());
    assert!(!pipeline.store().exists(ArtifactKind::ScoredIdeas));
}

#[tokio::test]
async fn scoring_rejects_stored_idea_with_malformed_source() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);
    let mut ideas = StubAgent::new("Acme").ideas();
    ideas["ideas"][2]["sources"] = json!(["not a url"]);
    seed_ideas_file(&pipeline, ideas).await;

    let err = pipeline.score().await.unwrap_err();
    match &err {
        PipelineError::Invariant {
            stage: Stage::Scoring,
            record: Some(record),
            ..
        } => assert!(record.starts_with("idea #3"), "{record}"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!pipeline.store().exists(ArtifactKind::ScoredIdeas));
}

#[tokio::test]
async fn scoring_rejects_stored_ideas_with_wrong_total_or_empty_title() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);
    let mut ideas = StubAgent::new("Acme").ideas();
    ideas["total_ideas"] = json!(7);
    seed_ideas_file(&pipeline, ideas.clone()).await;
    let err = pipeline.score().await.unwrap_err();
    assert!(err.to_string().contains("total_ideas is 7"), "{err}");

    ideas["total_ideas"] = json!(18);
    ideas["ideas"][0]["title"] = json!("");
    seed_ideas_file(&pipeline, ideas).await;
    let err = pipeline.score().await.unwrap_err();
    assert!(
        matches!(err, PipelineError::Invariant { stage: Stage::Scoring, .. }),
        "{err}"
    );
    assert!(!pipeline.store().exists(ArtifactKind::ScoredIdeas));
}

#[tokio::test]
async fn ideation_rejects_stored_brief_without_brand_name() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);
    pipeline.extract(DOSSIER, "Launch Q1").await.unwrap();
    let path = pipeline.store().path(ArtifactKind::Brief);
    let mut brief = read_json(&pipeline, ArtifactKind::Brief);
    brief["brand_name"] = json!("  ");
    std::fs::write(&path, serde_json::to_string_pretty(&brief).unwrap()).unwrap();

    let err = pipeline.ideate(None).await.unwrap_err();
    assert!(
        matches!(err, PipelineError::Invariant { stage: Stage::Ideation, .. }),
        "{err}"
    );
    assert!(!pipeline.store().exists(ArtifactKind::Ideas));
}

#[tokio::test]
async fn scoring_without_ideas_artifact_is_missing_input() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);
    pipeline.extract(DOSSIER, "Launch Q1").await.unwrap();
    let err = pipeline.score().await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingArtifact { .. }), "{err}");
}

#[tokio::test]
async fn full_run_artifacts_round_trip() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(StubAgent::new("Acme"), &dir);
    let output = pipeline.run(DOSSIER, "Launch Q1").await.unwrap();
    assert_eq!(output.scored.total_ideas, output.ideas.ideas.len());

    let brief_raw = read_json(&pipeline, ArtifactKind::Brief);
    let brief: BrandBrief = serde_json::from_value(brief_raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&brief).unwrap(), brief_raw);

    let ideas_raw = read_json(&pipeline, ArtifactKind::Ideas);
    let ideas: IdeaSet = serde_json::from_value(ideas_raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&ideas).unwrap(), ideas_raw);
    assert!(sources_are_absolute(&ideas));

    let scored_raw = read_json(&pipeline, ArtifactKind::ScoredIdeas);
    let scored: ScoredIdeaSet = serde_json::from_value(scored_raw.clone()).unwrap();
    pretty_assertions::assert_eq!(serde_json::to_value(&scored).unwrap(), scored_raw);
    assert_eq!(scored.brand_name, brief.brand_name);
}

fn sources_are_absolute(set: &IdeaSet) -> bool {
    set.ideas
        .iter()
        .flat_map(|i| &i.sources)
        .all(|s| url::Url::parse(s).is_ok_and(|u| u.has_host()))
}

#[tokio::test(start_paused = true)]
async fn stage_deadline_aborts_slow_stage() {
    let dir = TempDir::new().unwrap();
    let mut agent = StubAgent::new("Acme");
    agent.delay = Duration::from_secs(600);
    let mut config = Config::default();
    config.output.dir = dir.path().join("outputs");
    config.pipeline.stage_deadline_secs = Some(30);
    let pipeline = Pipeline::new(Arc::new(agent), config);

    let err = pipeline.extract(DOSSIER, "Launch Q1").await.unwrap_err();
    assert!(
        matches!(err, PipelineError::DeadlineExceeded { stage: Stage::Extraction, .. }),
        "{err}"
    );
    assert!(!pipeline.store().exists(ArtifactKind::Brief));
}
