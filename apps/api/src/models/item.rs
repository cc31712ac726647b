use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar attribute value (price, condition) as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Bool(bool),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Raw item attributes — the pipeline input. Owned by the caller, never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFeatures {
    pub title: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub visual_attributes: Option<Vec<String>>,
    #[serde(default)]
    pub price: Option<Scalar>,
    #[serde(default)]
    pub condition: Option<Scalar>,
}

impl ItemFeatures {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Renders an optional scalar for a prompt line. Absent → empty string.
    pub fn render(value: &Option<Scalar>) -> String {
        value.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }
}
