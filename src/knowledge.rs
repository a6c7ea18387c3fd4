use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Static facts about the learning centre, used both for quick answers and
/// as grounding context in the model prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFacts {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub hours: String,
    pub courses: Vec<String>,
}

impl KnowledgeFacts {
    /// The built-in record for Turon O'quv Markazi.
    pub fn turon() -> Self {
        Self {
            name: "Turon O'quv Markazi".to_string(),
            address: "Marhamat shahri".to_string(),
            phone: "+998 999082703".to_string(),
            hours: "09:00 - 18:00 (Dushanbadan Shanbagacha)".to_string(),
            courses: vec![
                "Dasturlash (Python, Java, Flutter)".to_string(),
                "Ingliz tili".to_string(),
                "Matematika va fizika".to_string(),
                "Kompyuter savodxonligi".to_string(),
            ],
        }
    }

    /// Load facts from a JSON file with the same shape as the serialized struct.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read facts file {}", path.display()))?;
        let facts: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse facts file {}", path.display()))?;
        Ok(facts)
    }

    /// Course list rendered for display.
    pub fn course_list(&self) -> String {
        self.courses.join(", ")
    }
}
