//! Subcommands of the `ayush` binary
//!
//! Each subcommand maps onto one engine operation and yields its JSON result.

use anyhow::Context;
use ayush_mapping::{MappingEngine, MappingFilter, System, TranslateRequest};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::PathBuf;

use crate::config::QueryConfig;

#[derive(Parser, Debug)]
#[command(name = "ayush", version)]
#[command(about = "Query AYUSH (NAMASTE) to ICD-11 concept mappings")]
pub struct Cli {
    /// Database connection URL (overrides configuration)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Show a concept with all of its ICD-11 links
    Lookup {
        /// ayurveda, siddha or unani
        system: System,
        code: String,
    },

    /// Translate a source code to informative ICD-11 matches
    Translate {
        /// Source code system URI
        #[arg(long, required_unless_present = "parameters")]
        system: Option<String>,

        #[arg(long, required_unless_present = "parameters")]
        code: Option<String>,

        /// Target code system URI
        #[arg(long)]
        target: Option<String>,

        /// Read a FHIR Parameters resource from this JSON file instead
        #[arg(long, conflicts_with_all = ["system", "code", "target"])]
        parameters: Option<PathBuf>,
    },

    /// Search concepts by code, display term or native term
    Search {
        query: String,

        /// Restrict to one system; unknown values are ignored
        #[arg(long)]
        system: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Browse mappings across all systems
    Mappings {
        #[arg(long)]
        system: Option<String>,

        #[arg(long)]
        min_confidence: Option<f64>,

        /// equivalent, related, wider, narrower or unmatched
        #[arg(long)]
        equivalence: Option<String>,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// List one system's concepts ordered by display term
    Concepts {
        system: System,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Check whether a code exists in a system
    Validate { system: System, code: String },

    /// Summary counts and equivalence distribution
    Stats,

    /// Export all terms as a FHIR CodeSystem
    Codesystem,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Lookup { .. } => "lookup",
            Command::Translate { .. } => "translate",
            Command::Search { .. } => "search",
            Command::Mappings { .. } => "mappings",
            Command::Concepts { .. } => "concepts",
            Command::Validate { .. } => "validate",
            Command::Stats => "stats",
            Command::Codesystem => "codesystem",
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<JsonValue> {
    serde_json::to_value(value).context("Failed to serialize result")
}

fn translate_request(
    system: Option<String>,
    code: Option<String>,
    target: Option<String>,
    parameters: Option<PathBuf>,
) -> anyhow::Result<TranslateRequest> {
    let Some(path) = parameters else {
        return Ok(TranslateRequest {
            system,
            code,
            target,
        });
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parameters: JsonValue = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(TranslateRequest::from_parameters(&parameters))
}

pub async fn run(
    command: Command,
    engine: &MappingEngine,
    limits: &QueryConfig,
) -> anyhow::Result<JsonValue> {
    match command {
        Command::Lookup { system, code } => {
            let result = engine
                .lookup(system, &code)
                .await
                .with_context(|| format!("Lookup of {code} failed"))?;
            to_json(&result)
        }
        Command::Translate {
            system,
            code,
            target,
            parameters,
        } => {
            let request = translate_request(system, code, target, parameters)?;
            to_json(&engine.translate(&request).await?)
        }
        Command::Search {
            query,
            system,
            limit,
        } => {
            let system = System::parse_filter(system.as_deref());
            let result = engine
                .search(&query, system, limits.search_limit(limit))
                .await?;
            to_json(&result)
        }
        Command::Mappings {
            system,
            min_confidence,
            equivalence,
            limit,
            offset,
        } => {
            let filter = MappingFilter::from_params(
                system.as_deref(),
                min_confidence,
                equivalence.as_deref(),
                limits.mappings_limit(limit),
                offset,
            );
            to_json(&engine.list_mappings(&filter).await?)
        }
        Command::Concepts {
            system,
            limit,
            offset,
        } => {
            let page = engine
                .list_system_concepts(system, limits.mappings_limit(limit), offset)
                .await?;
            to_json(&page)
        }
        Command::Validate { system, code } => to_json(&engine.validate_code(system, &code).await?),
        Command::Stats => to_json(&engine.compute_statistics().await),
        Command::Codesystem => Ok(engine.code_system().await?),
    }
}
