use std::path::PathBuf;

use djumblelog_events::TrackingConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
        }
    }
}

/// Journal configuration: which types are tracked, where templates live,
/// and the site domain used for feed links.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Creation- and deletion-tracked content type lists.
    pub tracking: TrackingConfig,
    /// Template directories searched before the bundled templates.
    pub template_dirs: Vec<PathBuf>,
    /// Domain used to build absolute feed links (default: `example.com`).
    pub site_domain: String,
}

impl JournalConfig {
    /// Load journal configuration from environment variables.
    ///
    /// | Env Var                    | Default        |
    /// |----------------------------|----------------|
    /// | `DJUMBLELOG_MODELS`        | unset (skip)   |
    /// | `DJUMBLELOG_MODELS_DELETE` | unset (skip)   |
    /// | `DJUMBLELOG_TEMPLATE_DIRS` | none           |
    /// | `DJUMBLELOG_SITE_DOMAIN`   | `example.com`  |
    ///
    /// The model lists are comma-separated `app_label.model` identifiers.
    /// An unset list disables that half of the tracking; identifiers are
    /// validated later by `connect_journal`.
    pub fn from_env() -> Self {
        let tracking = TrackingConfig {
            models: std::env::var("DJUMBLELOG_MODELS").ok().map(|v| split_list(&v)),
            models_delete: std::env::var("DJUMBLELOG_MODELS_DELETE")
                .ok()
                .map(|v| split_list(&v)),
        };

        let template_dirs = std::env::var("DJUMBLELOG_TEMPLATE_DIRS")
            .map(|v| split_list(&v).into_iter().map(PathBuf::from).collect())
            .unwrap_or_default();

        let site_domain =
            std::env::var("DJUMBLELOG_SITE_DOMAIN").unwrap_or_else(|_| "example.com".into());

        Self {
            tracking,
            template_dirs,
            site_domain,
        }
    }

    /// Absolute site link used as the feed channel link.
    pub fn site_link(&self) -> String {
        format!("http://{}", self.site_domain.trim_end_matches('/'))
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
