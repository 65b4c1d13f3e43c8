use std::collections::HashMap;
use std::env;

use notely_core::Selector;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_DELETE_ROUTE: &str = "/del";
const DEFAULT_CONTAINER_SELECTOR: &str = ".notes-container";
const DEFAULT_DELETE_SELECTOR: &str = ".delete-button";
const DEFAULT_NOTE_ID_ATTRIBUTE: &str = "data-note-id";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the deletion endpoint lives and how delete controls are recognised.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin of the notes app, without trailing slash
    pub base_url: String,
    /// Path prefix of the deletion endpoint; the note id is appended as a segment
    pub delete_route: String,
    pub container_selector: Selector,
    pub delete_selector: Selector,
    /// Attribute on the delete control holding the note id
    pub note_id_attribute: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = value_or_default(&lookup, "NOTELY_BASE_URL", DEFAULT_BASE_URL);
        let base_url = trim_trailing(&base_url).to_string();
        if !is_http_url(&base_url) {
            return Err(ConfigError::Invalid(
                "NOTELY_BASE_URL must be an http:// or https:// URL with a host".to_string(),
            ));
        }

        let delete_route = value_or_default(&lookup, "NOTELY_DELETE_ROUTE", DEFAULT_DELETE_ROUTE);
        if !delete_route.starts_with('/') {
            return Err(ConfigError::Invalid(
                "NOTELY_DELETE_ROUTE must start with /".to_string(),
            ));
        }
        let delete_route = trim_trailing(&delete_route).to_string();
        if delete_route.is_empty() {
            return Err(ConfigError::Invalid(
                "NOTELY_DELETE_ROUTE must name a path, not just /".to_string(),
            ));
        }

        let container_selector = parse_selector(
            &lookup,
            "NOTELY_CONTAINER_SELECTOR",
            DEFAULT_CONTAINER_SELECTOR,
        )?;
        let delete_selector =
            parse_selector(&lookup, "NOTELY_DELETE_SELECTOR", DEFAULT_DELETE_SELECTOR)?;

        let note_id_attribute =
            value_or_default(&lookup, "NOTELY_NOTE_ID_ATTRIBUTE", DEFAULT_NOTE_ID_ATTRIBUTE);
        if note_id_attribute.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "NOTELY_NOTE_ID_ATTRIBUTE must not contain whitespace".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            delete_route,
            container_selector,
            delete_selector,
            note_id_attribute: note_id_attribute.to_ascii_lowercase(),
        })
    }
}

fn parse_selector(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> Result<Selector, ConfigError> {
    let raw = value_or_default(lookup, name, default);
    Selector::parse(&raw)
        .map_err(|error| ConfigError::Invalid(format!("{name} is not a valid selector: {error}")))
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn is_http_url(value: &str) -> bool {
    let Some(rest) = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
    else {
        return false;
    };
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    !host.is_empty() && !host.starts_with(':')
}

fn trim_trailing(value: &str) -> &str {
    value.trim_end_matches('/')
}
