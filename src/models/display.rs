//! Display model implementations for table and JSON output
//!
//! Display models turn API response types into rows with CLI column names.

use chrono::{Local, TimeZone};
use serde::Serialize;
use tabled::Tabled;

use photoop::client::models::{Photo, PhotoInfo};

/// Photo listing row
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PhotoDisplay {
    #[tabled(rename = "PHOTO ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "VISIBILITY")]
    pub visibility: String,

    #[tabled(rename = "URL")]
    pub url: String,
}

impl From<&Photo> for PhotoDisplay {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id.clone(),
            title: or_dash(&photo.title),
            visibility: visibility(photo.ispublic).to_string(),
            url: photo.image_url("b"),
        }
    }
}

/// Photo details row
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PhotoInfoDisplay {
    #[tabled(rename = "PHOTO ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "OWNER")]
    pub owner: String,

    #[tabled(rename = "POSTED")]
    pub posted: String,

    #[tabled(rename = "TAKEN")]
    pub taken: String,

    #[tabled(rename = "VIEWS")]
    pub views: u64,

    #[tabled(rename = "VISIBILITY")]
    pub visibility: String,
}

impl From<&PhotoInfo> for PhotoInfoDisplay {
    fn from(info: &PhotoInfo) -> Self {
        let owner = if info.owner.username.is_empty() {
            info.owner.nsid.clone()
        } else {
            info.owner.username.clone()
        };

        Self {
            id: info.id.clone(),
            title: or_dash(&info.title.content),
            owner,
            posted: format_unix_local(&info.dates.posted),
            taken: or_dash(&info.dates.taken),
            views: info.views,
            visibility: visibility(info.visibility.ispublic).to_string(),
        }
    }
}

/// Result of one upload
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct UploadDisplay {
    #[tabled(rename = "FILE")]
    pub file: String,

    #[tabled(rename = "PHOTO ID")]
    pub photo_id: String,

    #[tabled(rename = "STATUS")]
    pub status: String,
}

/// Stored setting row
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SettingDisplay {
    #[tabled(rename = "KEY")]
    pub key: String,

    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl SettingDisplay {
    /// Row for a raw JSON setting. The session credential is never shown.
    pub fn new(key: String, raw: String, secret: bool) -> Self {
        let value = if secret {
            "(hidden)".to_string()
        } else {
            raw
        };
        Self { key, value }
    }
}

fn visibility(public: bool) -> &'static str {
    if public { "public" } else { "private" }
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Format Unix seconds (as text) in local time. "N/A" when absent or invalid.
pub fn format_unix_local(timestamp: &str) -> String {
    let secs: i64 = timestamp.parse().unwrap_or(0);
    if secs <= 0 {
        return "N/A".to_string();
    }

    match Local.timestamp_opt(secs, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => "N/A".to_string(),
    }
}
