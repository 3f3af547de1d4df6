use std::collections::BTreeSet;

const DEFAULT_MEDIA_API: &str = "https://api.cloudinary.com/v1_1";

/// Runtime settings shared by every handler.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub admins: AdminAllowList,
    /// Base URL used for links in outgoing email
    pub public_url: String,
    pub expose_errors: bool,
    pub media: MediaHostConfig,
}

/// The set of emails allowed to act as admins. Compared lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList {
    emails: BTreeSet<String>,
}

impl AdminAllowList {
    /// Parse a comma-separated list. Blank entries are ignored.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| normalize_email(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&normalize_email(email))
    }

    pub fn emails(&self) -> Vec<String> {
        self.emails.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Media host that stores uploaded resumes.
#[derive(Debug, Clone)]
pub struct MediaHostConfig {
    pub api_base: String,
    pub cloud_name: Option<String>,
    pub upload_preset: Option<String>,
    pub folder: String,
}

impl Default for MediaHostConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_MEDIA_API.to_string(),
            cloud_name: None,
            upload_preset: None,
            folder: "resumes".to_string(),
        }
    }
}

impl MediaHostConfig {
    /// Read `CLOUDINARY_*` variables. A missing cloud name leaves uploads
    /// disabled.
    pub fn from_env() -> Self {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.trim().is_empty())
        }

        let defaults = Self::default();
        Self {
            api_base: get_env("CLOUDINARY_API_BASE").unwrap_or(defaults.api_base),
            cloud_name: get_env("CLOUDINARY_CLOUD_NAME"),
            upload_preset: get_env("CLOUDINARY_UPLOAD_PRESET"),
            folder: get_env("CLOUDINARY_FOLDER").unwrap_or(defaults.folder),
        }
    }

    /// Endpoint for raw (non-image) uploads, if configured.
    pub fn upload_url(&self) -> Option<String> {
        let cloud = self.cloud_name.as_deref()?;
        Some(format!(
            "{}/{}/raw/upload",
            self.api_base.trim_end_matches('/'),
            cloud
        ))
    }
}
