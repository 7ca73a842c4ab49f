use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use wander_corpus::{CorpusSnapshot, Gazetteer};
use wander_protocol::{Language, SearchFilters, SearchQuery, SearchResult};
use wander_search::{DiscoveryEngine, RelatedConfig, SearchConfig};

#[derive(Parser)]
#[command(name = "wander", version, about = "Contextual discovery over travel posts")]
struct Cli {
    /// Corpus snapshot JSON file
    #[arg(long, global = true, default_value = "demos/corpus.json")]
    corpus: PathBuf,

    /// Gazetteer JSON file (builtin dataset when omitted)
    #[arg(long, global = true)]
    gazetteer: Option<PathBuf>,

    /// Search configuration JSON file (defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search posts with query expansion and multi-signal ranking
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum)]
        language: Option<LanguageFlag>,
        #[arg(long = "province")]
        provinces: Vec<String>,
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long = "amenity")]
        amenities: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        has_media: Option<bool>,
    },
    /// Posts similar to the given post
    Related {
        post_id: String,
        #[arg(long)]
        max_results: Option<usize>,
        #[arg(long)]
        min_similarity: Option<f32>,
    },
    /// Gazetteer locations near a given entry
    Nearby {
        location_id: String,
        #[arg(long, default_value_t = 50.0)]
        radius_km: f64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Autocomplete suggestions for a prefix
    Suggest {
        prefix: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Most popular place names
    Trending {
        #[arg(long, value_enum, default_value_t = LanguageFlag::Th)]
        language: LanguageFlag,
        #[arg(long, default_value_t = 6)]
        limit: usize,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum LanguageFlag {
    Th,
    En,
}

impl LanguageFlag {
    const fn as_domain(self) -> Language {
        match self {
            LanguageFlag::Th => Language::Th,
            LanguageFlag::En => Language::En,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SearchConfig::from_path(path)?,
        None => SearchConfig::default(),
    };
    let gazetteer = match &cli.gazetteer {
        Some(path) => Gazetteer::load(path)
            .with_context(|| format!("failed to load gazetteer {}", path.display()))?,
        None => Gazetteer::builtin().clone(),
    };
    let corpus = CorpusSnapshot::load(&cli.corpus)
        .with_context(|| format!("failed to load corpus {}", cli.corpus.display()))?;

    let engine = DiscoveryEngine::new(corpus, gazetteer, config)?;

    match cli.command {
        Command::Search {
            query,
            limit,
            language,
            provinces,
            categories,
            amenities,
            tags,
            has_media,
        } => {
            let filters = SearchFilters {
                provinces,
                categories,
                amenities,
                tags,
                has_media,
            };
            let request = SearchQuery {
                query,
                language: language.map_or(Language::Auto, LanguageFlag::as_domain),
                limit,
                filters: (!filters.is_empty()).then_some(filters),
            };
            let response = engine.search(&request)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!(
                    "{} of {} results for '{}' in {}ms (expanded: {})",
                    response.results.len(),
                    response.total_count,
                    response.query,
                    response.processing_time_ms,
                    response.expanded_terms.join(", ")
                );
                print_results(&response.results);
            }
        }
        Command::Related {
            post_id,
            max_results,
            min_similarity,
        } => {
            let defaults = engine.config().related;
            let related = RelatedConfig {
                max_results: max_results.unwrap_or(defaults.max_results),
                min_similarity_threshold: min_similarity
                    .unwrap_or(defaults.min_similarity_threshold),
                ..defaults
            };
            let results = engine.related_with(&post_id, &related)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!("{} related posts for {post_id}", results.len());
                print_results(&results);
            }
        }
        Command::Nearby {
            location_id,
            radius_km,
            limit,
        } => {
            let hits = engine.nearby(&location_id, radius_km, limit)?;
            if cli.json {
                let payload: Vec<serde_json::Value> = hits
                    .iter()
                    .map(|(location, distance)| {
                        serde_json::json!({"location": location, "distanceKm": distance})
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (location, distance) in hits {
                    println!("{:7.1} km  {} ({})", distance, location.name, location.province);
                }
            }
        }
        Command::Suggest { prefix, limit } => {
            let suggestions = engine.suggest(&prefix, limit);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else {
                for suggestion in suggestions {
                    println!(
                        "{:.2}  {}  [{}]",
                        suggestion.confidence,
                        suggestion.text,
                        suggestion.province.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Command::Trending { language, limit } => {
            let terms = engine.trending(language.as_domain(), limit);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&terms)?);
            } else {
                for term in terms {
                    println!("{term}");
                }
            }
        }
    }

    Ok(())
}

fn print_results(results: &[SearchResult]) {
    for (rank, result) in results.iter().enumerate() {
        let metrics = &result.search_metrics;
        println!(
            "{:2}. [{:.3}] {} — {}",
            rank + 1,
            metrics.final_score,
            result.post.id,
            result
                .highlighted_caption
                .as_deref()
                .unwrap_or(&result.post.caption)
        );
        log::debug!(
            "    relevance={:.3} popularity={:.3} recency={:.3} semantic={:.3}",
            metrics.relevance_score,
            metrics.popularity_score,
            metrics.recency_score,
            metrics.semantic_score
        );
    }
}
