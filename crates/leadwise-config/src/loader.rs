// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/leadwise/leadwise.toml` < `~/.config/leadwise/leadwise.toml`
//! < `./leadwise.toml` < `LEADWISE_*` variables < vendor key variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LeadwiseConfig;

const SYSTEM_CONFIG: &str = "/etc/leadwise/leadwise.toml";
const LOCAL_CONFIG: &str = "leadwise.toml";

/// Vendor variables that carry provider keys, and the key they set.
const VENDOR_KEYS: &[(&str, &str)] = &[
    ("GROQ_API_KEY", "providers.groq.api_key"),
    ("TOGETHER_API_KEY", "providers.together.api_key"),
    ("OPENAI_API_KEY", "providers.openai.api_key"),
    ("ANTHROPIC_API_KEY", "providers.anthropic.api_key"),
];

/// Sections reachable through `LEADWISE_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &["agent", "server", "retry", "client", "local", "rules", "rag"];

/// Provider tables reachable through `LEADWISE_PROVIDERS_<NAME>_<KEY>`.
const PROVIDERS: &[&str] = &["groq", "together", "openai", "anthropic"];

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<LeadwiseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. Used by tests and `--config -`.
pub fn load_config_from_str(toml_content: &str) -> Result<LeadwiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadwiseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadwiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadwiseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .merge(vendor_env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LeadwiseConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
        .merge(vendor_env_provider())
}

/// Candidate config files, lowest precedence first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(user) = user_config_path() {
        paths.push(user);
    }
    paths.push(
        std::env::current_dir()
            .map(|d| d.join(LOCAL_CONFIG))
            .unwrap_or_else(|_| PathBuf::from(LOCAL_CONFIG)),
    );
    paths
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("leadwise").join(LOCAL_CONFIG))
}

/// `LEADWISE_*` variables, mapped with explicit section prefixes.
///
/// Keys contain underscores, so `Env::split("_")` would be ambiguous:
/// `LEADWISE_CLIENT_FLUSH_INTERVAL_MS` must become `client.flush_interval_ms`.
fn env_provider() -> Env {
    Env::prefixed("LEADWISE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped variable name onto a dotted key.
pub fn map_env_key(key: &str) -> String {
    if let Some(rest) = key.strip_prefix("providers_") {
        for provider in PROVIDERS {
            if let Some(field) = rest.strip_prefix(provider).and_then(|r| r.strip_prefix('_')) {
                return format!("providers.{provider}.{field}");
            }
        }
        return key.to_string();
    }
    for section in SECTIONS {
        if let Some(field) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}

fn vendor_env_provider() -> Env {
    let names: Vec<&str> = VENDOR_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        VENDOR_KEYS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key.as_str()))
            .map(|(_, target)| (*target).to_string())
            .unwrap_or_else(|| key.as_str().to_owned())
            .into()
    })
}
