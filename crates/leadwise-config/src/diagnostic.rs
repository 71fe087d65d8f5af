// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment errors into miette diagnostics that point at the offending
//! key and suggest the closest valid one.

#![allow(unused_assignments)] // triggered by the miette derive expansion

use std::fmt::Write as _;

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a valid key must beat to be offered as a fix.
const CLOSE_ENOUGH: f64 = 0.75;

/// One problem found while loading or validating `leadwise.toml`.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a recognized key in {}", table_name(section))]
    #[diagnostic(
        code(leadwise::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid))
    )]
    UnknownKey {
        key: String,
        section: String,
        suggestion: Option<String>,
        valid: &'static [&'static str],
        #[label("unrecognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(leadwise::config::invalid_type), help("use {expected} here"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("`{key}` is required")]
    #[diagnostic(code(leadwise::config::missing_key))]
    MissingKey { key: String },

    #[error("{message}")]
    #[diagnostic(code(leadwise::config::validation))]
    Validation { message: String },

    #[error("could not load configuration: {0}")]
    #[diagnostic(code(leadwise::config::load))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

fn table_name(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid: &[&str]) -> String {
    let listed = valid.join(", ");
    match suggestion {
        Some(fix) => format!("did you mean `{fix}`? (expected one of: {listed})"),
        None => format!("expected one of: {listed}"),
    }
}

/// Splits a figment error chain into one [`ConfigError`] per problem.
///
/// `sources` holds `(name, content)` pairs for every TOML document that was
/// merged, so unknown keys can be underlined in the file they came from.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter().map(|error| convert(&error, sources)).collect()
}

fn convert(error: &figment::Error, sources: &[(String, String)]) -> ConfigError {
    let section = error.path.join(".");
    match &error.kind {
        Kind::UnknownField(key, valid) => {
            let (span, src) = locate(error, key, sources).unzip();
            ConfigError::UnknownKey {
                key: key.clone(),
                suggestion: suggest_key(key, valid),
                section,
                valid: *valid,
                span,
                src,
            }
        }
        Kind::MissingField(key) if section.is_empty() => ConfigError::MissingKey {
            key: key.to_string(),
        },
        Kind::MissingField(key) => ConfigError::MissingKey {
            key: format!("{section}.{key}"),
        },
        Kind::InvalidType(found, expected) => ConfigError::InvalidType {
            key: section,
            found: found.to_string(),
            expected: expected.clone(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Finds the document an error came from and the key's position in it.
fn locate(
    error: &figment::Error,
    key: &str,
    sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let file = error.metadata.as_ref().and_then(|meta| match meta.source.as_ref() {
        Some(figment::Source::File(path)) => Some(path.display().to_string()),
        _ => None,
    });
    let (name, content) = match file {
        Some(file) => sources.iter().find(|(name, _)| *name == file)?,
        // Inline documents have no file source.
        None => match sources {
            [only] => only,
            _ => return None,
        },
    };
    let offset = find_key_offset(content, &error.path, key)?;
    Some((
        SourceSpan::new(offset.into(), key.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `key` inside the TOML table named by `path`.
///
/// Tracks `[table]` headers line by line, so a key is only matched inside
/// its own table. A sub-table header such as `[providers.mistral]` counts as
/// an occurrence of `mistral` under `["providers"]`.
pub fn find_key_offset(content: &str, path: &[String], key: &str) -> Option<usize> {
    let wanted = path.join(".");
    let mut table = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let text = line.trim();

        if let Some(header) = text.strip_prefix('[').and_then(|rest| rest.split(']').next()) {
            let header = header.trim_matches(['[', ' ']);
            let nested = header
                .strip_prefix(wanted.as_str())
                .map(|rest| rest.trim_start_matches('.'));
            if nested == Some(key) && (wanted.is_empty() || header.len() > wanted.len()) {
                return content[offset..].find(key).map(|at| offset + at);
            }
            table = header.to_string();
        } else if table == wanted {
            let name = text.split('=').next().unwrap_or_default().trim();
            if name == key {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }
    None
}

/// Closest valid key by Jaro-Winkler similarity, if it is close enough.
pub fn suggest_key(unknown: &str, valid: &[&str]) -> Option<String> {
    let (score, best) = valid
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .max_by(|a, b| a.0.total_cmp(&b.0))?;
    (score > CLOSE_ENOUGH).then(|| best.to_string())
}

/// Prints every error to stderr, followed by a one-line summary.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        if handler.render_report(&mut out, error).is_err() {
            let _ = writeln!(out, "error: {error}");
        }
    }
    let noun = if errors.len() == 1 { "problem" } else { "problems" };
    eprintln!("{out}leadwise: {} configuration {noun}", errors.len());
}
