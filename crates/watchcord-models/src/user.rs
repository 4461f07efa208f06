use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Account-wide display name. Absent on accounts that never set one.
    pub global_name: Option<String>,
    /// Legacy four-digit tag. `"0"` or absent on migrated accounts.
    pub discriminator: Option<String>,
    /// Avatar asset hash. Absent when the user runs the platform default.
    pub avatar: Option<String>,
    pub bot: bool,
}

impl User {
    /// Registry key for this user: legacy accounts keep the
    /// `name#discriminator` form, migrated accounts are keyed by bare
    /// username.
    pub fn identity_key(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }

    /// CDN URL for the user's avatar in the requested static format,
    /// sized for entity pictures. Users without a custom avatar get the
    /// platform default asset for their index.
    pub fn avatar_url(&self, cdn_base: &str, format: ImageFormat) -> String {
        match &self.avatar {
            Some(hash) => format!(
                "{}/avatars/{}/{}.{}?size=1024",
                cdn_base,
                self.id,
                hash,
                format.as_str()
            ),
            None => format!("{}/embed/avatars/{}.png", cdn_base, self.default_avatar_index()),
        }
    }

    fn default_avatar_index(&self) -> i64 {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => d.parse::<i64>().map(|n| n % 5).unwrap_or(0),
            _ => (self.id >> 22) % 6,
        }
    }
}

/// Static image format used when rendering avatar URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Webp,
    Jpeg,
    Jpg,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Jpg => "jpg",
        }
    }
}

impl Default for ImageFormat {
    fn default() -> Self {
        ImageFormat::Webp
    }
}
