//! Label taxonomy definitions.
//!
//! The one-time `register-labels` path publishes these into the issuer's
//! labeler service record so clients can render the four houses with
//! localized names and sensible defaults.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sortinghat_core::label::House;

/// Localized strings for one label value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleStrings {
    pub lang: String,
    pub name: String,
    pub description: String,
}

/// One label value definition, as carried in the labeler service record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDefinition {
    pub identifier: House,
    pub severity: String,
    pub blurs: String,
    pub default_setting: String,
    pub adult_only: bool,
    pub locales: Vec<LocaleStrings>,
}

fn definition(house: House, en: (&str, &str), pt: (&str, &str)) -> LabelDefinition {
    LabelDefinition {
        identifier: house,
        severity: "inform".into(),
        blurs: "none".into(),
        default_setting: "warn".into(),
        adult_only: false,
        locales: vec![
            LocaleStrings {
                lang: "en".into(),
                name: en.0.into(),
                description: en.1.into(),
            },
            LocaleStrings {
                lang: "pt-BR".into(),
                name: pt.0.into(),
                description: pt.1.into(),
            },
        ],
    }
}

/// The four house definitions with English and Brazilian-Portuguese locales.
pub fn house_definitions() -> Vec<LabelDefinition> {
    vec![
        definition(
            House::Ravenclaw,
            ("Ravenclaw 🦅", "Wise, creative, and curious."),
            ("Corvinal 🦅", "Sábio, criativo e curioso."),
        ),
        definition(
            House::Slytherin,
            ("Slytherin 🐍", "Ambitious, cunning, and resourceful."),
            ("Sonserina 🐍", "Ambicioso, astuto e engenhoso."),
        ),
        definition(
            House::Gryffindor,
            ("Gryffindor 🦁", "Brave, bold, and daring."),
            ("Grifinória 🦁", "Corajoso, ousado e destemido."),
        ),
        definition(
            House::Hufflepuff,
            ("Hufflepuff 🦡", "Loyal, hardworking, and fair."),
            ("Lufa-Lufa 🦡", "Leal, trabalhador e justo."),
        ),
    ]
}

/// The full `app.bsky.labeler.service` record for `putRecord`.
pub fn labeler_service_record() -> serde_json::Value {
    let definitions = house_definitions();
    let values: Vec<serde_json::Value> = definitions
        .iter()
        .map(|d| serde_json::json!({ "val": d.identifier }))
        .collect();

    serde_json::json!({
        "$type": "app.bsky.labeler.service",
        "policies": {
            "labelValues": values,
            "labelValueDefinitions": definitions,
        },
        "createdAt": Utc::now().to_rfc3339(),
    })
}
