//! Narrative messages and the translation seam.
//!
//! The simulation never formats user-facing prose directly. It asks a
//! [`Translate`] implementation for a template by key and substitutes named
//! parameters, so the presentation layer can plug in its own localisation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Translation keys emitted by the simulation.
pub mod keys {
    pub const PLANT_DIED: &str = "plant.died";
    pub const PLANT_WITHERED: &str = "plant.withered";
    pub const VEGETATION_DENSER: &str = "vegetation.denser";
    pub const VEGETATION_THINNER: &str = "vegetation.thinner";
    pub const WEATHER_CHANGED: &str = "weather.changed";
    pub const SEASON_CHANGED: &str = "season.changed";
}

/// Which stream a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Narrative,
    System,
}

/// A line for the narrative log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeMessage {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl NarrativeMessage {
    pub fn narrative(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Narrative,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::System,
        }
    }
}

/// Localisation lookup: `t(key, params) -> text`.
pub trait Translate: fmt::Debug + Send + Sync {
    fn t(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Built-in English strings. Unknown keys render as the key itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishCatalog;

impl EnglishCatalog {
    fn template(key: &str) -> Option<&'static str> {
        let template = match key {
            keys::PLANT_DIED => "The {name} has died.",
            keys::PLANT_WITHERED => "The {name} has withered away.",
            keys::VEGETATION_DENSER => "The vegetation around you has grown noticeably thicker.",
            keys::VEGETATION_THINNER => "The vegetation around you has thinned out noticeably.",
            keys::WEATHER_CHANGED => "The weather turns {weather}.",
            keys::SEASON_CHANGED => "The season turns to {season}.",
            _ => return None,
        };
        Some(template)
    }
}

impl Translate for EnglishCatalog {
    fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        match Self::template(key) {
            Some(template) => render(template, params),
            None => key.to_string(),
        }
    }
}

/// Replace every `{name}` placeholder with its parameter value.
pub fn render(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_catalog_fills_parameters() {
        let text = EnglishCatalog.t(keys::PLANT_DIED, &[("name", "fern")]);
        assert_eq!(text, "The fern has died.");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        assert_eq!(EnglishCatalog.t("nope.missing", &[]), "nope.missing");
    }

    #[test]
    fn message_serializes_kind_as_type() {
        let json = serde_json::to_string(&NarrativeMessage::system("hi")).unwrap();
        assert_eq!(json, r#"{"text":"hi","type":"system"}"#);
    }
}
