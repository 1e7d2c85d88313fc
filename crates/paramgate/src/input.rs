//! Assembling raw input from CLI sources
//!
//! Later sources win per key: `--input` document, then `--query`, then each
//! `--param` in order.

use std::{io::Read, path::Path};

use anyhow::{Context, Result};
use paramgate_core::{Error, RawInput};

use crate::cli::InputArgs;

/// Merge every source named by `args` into one input
pub fn collect(args: &InputArgs) -> Result<RawInput> {
    let document = match &args.input {
        Some(path) => read_document(path)?,
        None => RawInput::new(),
    };

    let query = args
        .query
        .as_deref()
        .map(RawInput::from_query)
        .unwrap_or_default();

    let params = args
        .params
        .iter()
        .map(|param| parse_param(param))
        .collect::<Result<RawInput>>()?;

    Ok(document.merge(&query).merge(&params))
}

fn read_document(path: &Path) -> Result<RawInput> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read input from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| Error::io_error(format!("Failed to read {}: {e}", path.display())))?
    };

    Ok(RawInput::from_json_str(&content)?)
}

/// `key=value`; the value may be empty and may contain `=`
fn parse_param(param: &str) -> Result<(String, String)> {
    param
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| {
            Error::parse_error(format!("Invalid parameter '{param}', expected KEY=VALUE")).into()
        })
}
