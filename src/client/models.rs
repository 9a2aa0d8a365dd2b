//! Response types for the photo REST methods used by the CLI

use serde::{Deserialize, Deserializer, Serialize};

/// Entry in a photo listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,

    #[serde(default)]
    pub owner: String,

    pub secret: String,

    pub server: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, deserialize_with = "flag")]
    pub ispublic: bool,
}

impl Photo {
    /// Static image URL. `size` is a provider size suffix such as `"q"` or `"b"`.
    pub fn image_url(&self, size: &str) -> String {
        image_url(&self.server, &self.id, &self.secret, size)
    }
}

/// One page of a photo listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoPage {
    #[serde(deserialize_with = "lenient_u64")]
    pub page: u64,

    #[serde(deserialize_with = "lenient_u64")]
    pub pages: u64,

    #[serde(deserialize_with = "lenient_u64")]
    pub perpage: u64,

    #[serde(deserialize_with = "lenient_u64")]
    pub total: u64,

    #[serde(default)]
    pub photo: Vec<Photo>,
}

/// `{"photos": {...}}`, as returned by listing methods
#[derive(Debug, Clone, Deserialize)]
pub struct PhotosEnvelope {
    pub photos: PhotoPage,
}

/// `{"_content": "..."}` text wrapper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "_content", default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub nsid: String,

    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    #[serde(default, deserialize_with = "flag")]
    pub ispublic: bool,

    #[serde(default, deserialize_with = "flag")]
    pub isfriend: bool,

    #[serde(default, deserialize_with = "flag")]
    pub isfamily: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dates {
    /// Unix seconds, as text
    #[serde(default)]
    pub posted: String,

    /// `YYYY-MM-DD hh:mm:ss`, camera local time
    #[serde(default)]
    pub taken: String,
}

/// Full details of one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoInfo {
    pub id: String,
    pub secret: String,
    pub server: String,

    #[serde(default)]
    pub owner: Owner,

    #[serde(default)]
    pub title: Content,

    #[serde(default)]
    pub description: Content,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub dates: Dates,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub views: u64,
}

impl PhotoInfo {
    pub fn image_url(&self, size: &str) -> String {
        image_url(&self.server, &self.id, &self.secret, size)
    }
}

/// `{"photo": {...}}`, as returned by `flickr.photos.getInfo`
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoInfoEnvelope {
    pub photo: PhotoInfo,
}

/// `{"user": {...}}`, as returned by `flickr.test.login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginEnvelope {
    pub user: LoginUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub id: String,

    #[serde(default)]
    pub username: Content,
}

fn image_url(server: &str, id: &str, secret: &str, size: &str) -> String {
    format!(
        "https://live.staticflickr.com/{}/{}_{}_{}.jpg",
        server, id, secret, size
    )
}

/// Counts arrive as numbers or as numeric strings depending on the method
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.is_empty() => Ok(0),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Boolean flags arrive as `0`/`1`
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Number(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Number(n) => n != 0,
        Raw::Text(s) => s == "1" || s.eq_ignore_ascii_case("true"),
    })
}
