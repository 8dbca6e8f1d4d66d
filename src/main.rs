//! Ideaforge CLI - brand brief extraction, ideation and scoring
//!
//! The pipeline lives in lib.rs; this file parses arguments, sets up logging
//! and prints results.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use ideaforge::{
    display, dossier, ArtifactKind, BrandBrief, Config, GeminiAgent, IdeaScore, IdeaSet, Pipeline,
    SchemaDescriptor, ScoredIdeaSet,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ideaforge")]
#[command(author, version, about = "Brand brief extraction, ideation and idea scoring", long_about = None)]
struct Cli {
    /// Path to ideaforge.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory for stage artifacts (overrides [output].dir)
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a brand brief from a dossier
    Extract {
        /// Dossier file (text or PDF) or URL
        #[arg(long)]
        dossier: String,
        /// Campaign goal
        #[arg(long)]
        goal: String,
    },
    /// Generate ideas from the stored brand brief
    Ideate {
        /// Dossier file or URL passed as an excerpt for richer hooks
        #[arg(long)]
        dossier: Option<String>,
    },
    /// Score the stored ideas against the stored brief
    Score {
        /// Scoring calls in flight at once
        #[arg(long)]
        concurrency: Option<usize>,
        /// Record per-idea failures and continue
        #[arg(long)]
        keep_going: bool,
    },
    /// Run extraction, ideation and scoring in order
    Run {
        #[arg(long)]
        dossier: String,
        #[arg(long)]
        goal: String,
    },
    /// Print a stored artifact
    Show {
        artifact: Artifact,
        /// Number of ranked ideas to show for scored ideas
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Print the JSON schema sent with each stage prompt
    Schema { target: SchemaTarget },
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Clone, Copy, ValueEnum)]
enum Artifact {
    Brief,
    Ideas,
    Scored,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaTarget {
    Brief,
    Ideas,
    Score,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = &cli.out_dir {
        config.output.dir = dir.clone();
    }
    Ok(config)
}

/// Builds the pipeline; fails before any stage runs when the credential is missing.
fn build_pipeline(config: Config) -> anyhow::Result<Pipeline> {
    let agent = GeminiAgent::new(&config)?;
    Ok(Pipeline::new(Arc::new(agent), config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ideaforge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Extract {
            dossier: source,
            goal,
        } => {
            let pipeline = build_pipeline(load_config(&cli)?)?;
            let dossier = dossier::load(source).await?;
            let brief = pipeline.extract(&dossier.text, goal).await?;
            display::print_brief(&brief);
            println!("\nSaved → {}", pipeline.store().path(ArtifactKind::Brief).display());
        }
        Commands::Ideate { dossier: source } => {
            let pipeline = build_pipeline(load_config(&cli)?)?;
            let text = match source {
                Some(source) => Some(dossier::load(source).await?.text),
                None => None,
            };
            let ideas = pipeline.ideate(text.as_deref()).await?;
            display::print_ideas(&ideas);
            println!("\nSaved → {}", pipeline.store().path(ArtifactKind::Ideas).display());
        }
        Commands::Score {
            concurrency,
            keep_going,
        } => {
            let pipeline = build_pipeline(load_config(&cli)?)?;
            let mut options = pipeline.config().scoring_options();
            if let Some(n) = concurrency {
                options.concurrency = (*n).max(1);
            }
            options.keep_going |= *keep_going;
            let scored = pipeline.score_with(options).await?;
            display::print_scored(&scored, 10);
            println!(
                "\nSaved → {}",
                pipeline.store().path(ArtifactKind::ScoredIdeas).display()
            );
        }
        Commands::Run {
            dossier: source,
            goal,
        } => {
            let pipeline = build_pipeline(load_config(&cli)?)?;
            let dossier = dossier::load(source).await?;
            let output = pipeline.run(&dossier.text, goal).await?;
            display::print_brief(&output.brief);
            println!();
            display::print_scored(&output.scored, 10);
            println!("\nArtifacts in {}", pipeline.store().dir().display());
        }
        Commands::Show { artifact, top } => {
            let config = load_config(&cli)?;
            let store = ideaforge::ArtifactStore::new(&config.output.dir);
            match artifact {
                Artifact::Brief => {
                    let brief: BrandBrief = store
                        .load(ArtifactKind::Brief)?
                        .context("no brand brief found, run `ideaforge extract` first")?;
                    display::print_brief(&brief);
                }
                Artifact::Ideas => {
                    let ideas: IdeaSet = store
                        .load(ArtifactKind::Ideas)?
                        .context("no ideas found, run `ideaforge ideate` first")?;
                    display::print_ideas(&ideas);
                }
                Artifact::Scored => {
                    let scored: ScoredIdeaSet = store
                        .load(ArtifactKind::ScoredIdeas)?
                        .context("no scored ideas found, run `ideaforge score` first")?;
                    display::print_scored(&scored, *top);
                }
            }
        }
        Commands::Schema { target } => {
            let descriptor = match target {
                SchemaTarget::Brief => SchemaDescriptor::of::<BrandBrief>(),
                SchemaTarget::Ideas => SchemaDescriptor::of::<IdeaSet>(),
                SchemaTarget::Score => SchemaDescriptor::of::<IdeaScore>(),
            };
            println!("{}", descriptor.render());
        }
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "ideaforge", &mut std::io::stdout());
        }
    }

    Ok(())
}
