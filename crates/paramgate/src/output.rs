//! Output envelopes
//!
//! JSON mode writes exactly one object to stdout:
//! - success: `{ "ok": true, "data": ... }`
//! - rejected input: `{ "ok": false, "status": 422, "errors": [...] }`
//! - failure: `{ "ok": false, "error": { "code": ..., "message": ... } }`
//!
//! Human mode writes results to stdout and problems to stderr.

use std::io::Write;

use paramgate_core::{Error, ValidationErrors};
use serde::Serialize;
use serde_json::json;

/// HTTP status a rejected request maps to
pub const UNPROCESSABLE: u16 = 422;

/// Print a value as pretty JSON
pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    writeln!(std::io::stdout(), "{rendered}")?;
    Ok(())
}

/// Success envelope around `data`
pub fn success_envelope(data: &impl Serialize) -> anyhow::Result<serde_json::Value> {
    Ok(json!({ "ok": true, "data": serde_json::to_value(data)? }))
}

/// Rejection envelope listing every violation
pub fn rejection_envelope(errors: &ValidationErrors) -> serde_json::Value {
    json!({ "ok": false, "status": UNPROCESSABLE, "errors": errors })
}

/// Failure envelope; core errors keep their category code
pub fn error_envelope(err: &anyhow::Error) -> serde_json::Value {
    let code = err.downcast_ref::<Error>().map_or("ERROR", Error::code);
    json!({
        "ok": false,
        "error": { "code": code, "message": format_error(err) },
    })
}

/// Report rejected input in the selected mode
pub fn rejection(json_mode: bool, errors: &ValidationErrors) -> anyhow::Result<()> {
    if json_mode {
        return print_json(&rejection_envelope(errors));
    }

    let mut stderr = std::io::stderr();
    writeln!(stderr, "Request rejected ({UNPROCESSABLE}):")?;
    for error in errors {
        writeln!(stderr, "  {}: {}", error.field, error.reason)?;
    }
    Ok(())
}

/// Report a failure in the selected mode
pub fn error(json_mode: bool, err: &anyhow::Error) {
    if json_mode && print_json(&error_envelope(err)).is_ok() {
        return;
    }
    #[allow(clippy::print_stderr)]
    {
        eprintln!("Error: {}", format_error(err));
    }
}

/// Error message followed by any cause that adds information
pub fn format_error(err: &anyhow::Error) -> String {
    err.chain().skip(1).fold(err.to_string(), |msg, cause| {
        let cause = cause.to_string();
        if cause.is_empty() || msg.contains(&cause) {
            msg
        } else {
            format!("{msg}: {cause}")
        }
    })
}

/// Process exit code for a failure.
///
/// Core errors keep their category (2 configuration/IO/parse, 3
/// access/service); anything else is a system error (2).
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>()
        .and_then(|core| u8::try_from(core.exit_code()).ok())
        .unwrap_or(2)
}
