//! Picture of the day payload

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A picture as returned by the source endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    pub date: NaiveDate,
    pub title: String,
    pub explanation: String,
    /// Display-size image (or video page when `media_type` is "video")
    pub url: String,
    /// Full-resolution image, if offered
    #[serde(default)]
    pub hdurl: Option<String>,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    #[serde(default)]
    pub copyright: Option<String>,
}

fn default_media_type() -> String {
    "image".to_string()
}

impl Picture {
    /// Best URL to open in a browser
    pub fn full_url(&self) -> &str {
        self.hdurl.as_deref().unwrap_or(&self.url)
    }

    pub fn is_video(&self) -> bool {
        self.media_type == "video"
    }

    /// Date in a readable form, e.g. "Monday, January 15, 2024"
    pub fn date_display(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }

    /// Credit line, trimmed of the stray whitespace the source sometimes includes
    pub fn credit(&self) -> Option<String> {
        self.copyright
            .as_deref()
            .map(|c| c.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|c| !c.is_empty())
    }
}
