use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What the front of a card shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub key: String,
    pub label: String,
    pub glyph: String,
}

impl Face {
    pub fn new(key: &str, label: &str, glyph: &str) -> Self {
        Face {
            key: key.to_string(),
            label: label.to_string(),
            glyph: glyph.to_string(),
        }
    }
}

const COUNTRIES: [(&str, &str, &str); 8] = [
    ("alemanha", "Alemanha", "🇩🇪"),
    ("belgica", "Bélgica", "🇧🇪"),
    ("franca", "França", "🇫🇷"),
    ("gales", "Gales", "🏴󠁧󠁢󠁷󠁬󠁳󠁿"),
    ("islandia", "Islândia", "🇮🇸"),
    ("italia", "Itália", "🇮🇹"),
    ("polonia", "Polónia", "🇵🇱"),
    ("portugal", "Portugal", "🇵🇹"),
];

pub fn default_faces() -> Vec<Face> {
    COUNTRIES
        .iter()
        .map(|(key, label, glyph)| Face::new(key, label, glyph))
        .collect()
}

/// Rejects face sets where two faces share a key, since each key must map to exactly one pair.
pub fn validate_faces(faces: &[Face]) -> Result<()> {
    let mut seen = HashSet::with_capacity(faces.len());
    for face in faces {
        if !seen.insert(face.key.as_str()) {
            return Err(Error::DuplicateFace(face.key.clone()));
        }
    }
    Ok(())
}
