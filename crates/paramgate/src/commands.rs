//! Command handlers

use std::io::Write;

use anyhow::Result;
use paramgate_core::{
    catalog::{BookSearch, SearchResults},
    config::load_config,
    serve_raw, BoundaryError, Error, ModelSchema, RequestModel, SchemaRegistry,
};
use serde::Serialize;
use tracing::info;

use crate::{
    cli::{Cli, Commands, InputArgs},
    input, output,
};

/// How a command finished when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The input did not validate
    Rejected,
}

impl Outcome {
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Done => 0,
            Self::Rejected => 1,
        }
    }
}

/// Load configuration and dispatch
pub fn run(cli: &Cli) -> Result<Outcome> {
    let config = load_config(cli.config.as_deref())?.with_unpermitted(cli.unpermitted);
    let registry = config.registry().map_err(Error::from)?;

    match &cli.command {
        Commands::Schemas => schemas(&registry, cli.json),
        Commands::Describe { schema } => describe(lookup(&registry, schema)?, cli.json),
        Commands::Check { schema, input } => check(lookup(&registry, schema)?, input, cli.json),
        Commands::Search { input } => search(&registry, input, cli.json),
    }
}

fn lookup<'a>(registry: &'a SchemaRegistry, name: &str) -> Result<&'a ModelSchema> {
    Ok(registry.get(name).map_err(Error::from)?)
}

#[derive(Debug, Serialize)]
struct SchemaSummary<'a> {
    name: &'a str,
    fields: usize,
    nested: Vec<&'a str>,
    unpermitted: String,
}

fn schemas(registry: &SchemaRegistry, json: bool) -> Result<Outcome> {
    let summaries: Vec<SchemaSummary<'_>> = registry
        .iter()
        .map(|schema| SchemaSummary {
            name: schema.name(),
            fields: schema.fields().len(),
            nested: schema.nested().iter().map(|n| n.prefix()).collect(),
            unpermitted: schema.unpermitted().to_string(),
        })
        .collect();

    if json {
        output::print_json(&output::success_envelope(&summaries)?)?;
    } else {
        let mut stdout = std::io::stdout();
        for summary in &summaries {
            write!(
                stdout,
                "{}  {} fields, unpermitted={}",
                summary.name, summary.fields, summary.unpermitted
            )?;
            if !summary.nested.is_empty() {
                write!(stdout, ", nested={}", summary.nested.join(","))?;
            }
            writeln!(stdout)?;
        }
    }
    Ok(Outcome::Done)
}

fn describe(schema: &ModelSchema, json: bool) -> Result<Outcome> {
    let rendered = schema.to_json_schema();
    if json {
        output::print_json(&output::success_envelope(&rendered)?)?;
    } else {
        output::print_json(&rendered)?;
    }
    Ok(Outcome::Done)
}

fn check(schema: &ModelSchema, args: &InputArgs, json: bool) -> Result<Outcome> {
    let raw = input::collect(args)?;
    match schema.build(&raw) {
        Ok(model) => {
            info!(schema = schema.name(), fields = model.len(), "request model valid");
            if json {
                output::print_json(&output::success_envelope(&model)?)?;
            } else {
                print_model(&model)?;
            }
            Ok(Outcome::Done)
        }
        Err(errors) => {
            output::rejection(json, &errors)?;
            Ok(Outcome::Rejected)
        }
    }
}

fn print_model(model: &RequestModel) -> Result<()> {
    let mut stdout = std::io::stdout();
    for (key, value) in model.to_raw_input().iter() {
        writeln!(stdout, "{key} = {}", serde_json::to_string(value)?)?;
    }
    Ok(())
}

fn search(registry: &SchemaRegistry, args: &InputArgs, json: bool) -> Result<Outcome> {
    let schema = lookup(registry, "book_search")?.clone();
    let service = BookSearch::with_sample_catalog()
        .map_err(Error::from)?
        .with_schema(schema);
    let raw = input::collect(args)?;

    match serve_raw(&service, &raw) {
        Ok(results) => {
            if json {
                output::print_json(&output::success_envelope(&results)?)?;
            } else {
                print_results(&results)?;
            }
            Ok(Outcome::Done)
        }
        Err(BoundaryError::Rejected(errors)) => {
            output::rejection(json, &errors)?;
            Ok(Outcome::Rejected)
        }
        Err(BoundaryError::Service(err)) => Err(err.into()),
    }
}

fn print_results(results: &SearchResults) -> Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{} matches, page {}", results.total, results.page)?;
    for book in &results.books {
        writeln!(
            stdout,
            "  {} by {} [{}{}] {}",
            book.title,
            book.author,
            book.format,
            if book.in_print { "" } else { ", out of print" },
            book.publisher.name
        )?;
    }
    Ok(())
}
