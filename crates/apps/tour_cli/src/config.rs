use std::path::PathBuf;
use std::sync::Arc;

use auth::{AdminCredentials, LocalAuth};
use persistence::{
    DEFAULT_CACHE_KEY, DirRecordStore, FileTourCache, ImageOptions, LocalAdapter,
    PersistenceAdapter, RemoteAdapter, TourCache,
};
use persistence::imaging::{DEFAULT_MAX_WIDTH, DEFAULT_QUALITY};

/// Which persistence adapter the composition root wires in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// The local cache is the only store; uploads are embedded inline.
    #[default]
    Local,
    /// Record store plus object store under the data directory.
    Remote,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Backend::Local),
            "remote" => Ok(Backend::Remote),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourConfig {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub cache_key: String,
    pub public_url: String,
    pub admin: Option<AdminCredentials>,
    pub image: ImageOptions,
}

impl TourConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                      |
    /// |----------------------------|------------------------------|
    /// | `TOUR_BACKEND`             | `local`                      |
    /// | `TOUR_DATA_DIR`            | `./tour-data`                |
    /// | `TOUR_CACHE_KEY`           | `tourData`                   |
    /// | `TOUR_PUBLIC_URL`          | `file://<data dir>/objects`  |
    /// | `TOUR_ADMIN_USER`          | unset (no admin)             |
    /// | `TOUR_ADMIN_PASSWORD_HASH` | unset (no admin)             |
    /// | `TOUR_MAX_IMAGE_WIDTH`     | `1920`                       |
    /// | `TOUR_IMAGE_QUALITY`       | `70`                         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let backend = match get("TOUR_BACKEND") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "TOUR_BACKEND",
                value: raw,
                reason,
            })?,
            None => Backend::default(),
        };
        let data_dir = PathBuf::from(get("TOUR_DATA_DIR").unwrap_or_else(|| "./tour-data".into()));
        let cache_key = get("TOUR_CACHE_KEY").unwrap_or_else(|| DEFAULT_CACHE_KEY.into());
        let public_url = get("TOUR_PUBLIC_URL").unwrap_or_else(|| default_public_url(&data_dir));

        let admin = match (get("TOUR_ADMIN_USER"), get("TOUR_ADMIN_PASSWORD_HASH")) {
            (Some(user), Some(password_hash)) => Some(AdminCredentials {
                user,
                password_hash,
            }),
            _ => None,
        };

        let max_width = parse_or("TOUR_MAX_IMAGE_WIDTH", get("TOUR_MAX_IMAGE_WIDTH"), DEFAULT_MAX_WIDTH)?;
        let quality: u8 = parse_or("TOUR_IMAGE_QUALITY", get("TOUR_IMAGE_QUALITY"), DEFAULT_QUALITY)?;
        if !(1..=100).contains(&quality) {
            return Err(ConfigError::Invalid {
                var: "TOUR_IMAGE_QUALITY",
                value: quality.to_string(),
                reason: "must be between 1 and 100".into(),
            });
        }

        Ok(Self {
            backend,
            data_dir,
            cache_key,
            public_url,
            admin,
            image: ImageOptions { max_width, quality },
        })
    }

    /// Points the data directory elsewhere. A public URL derived from the old
    /// directory follows it.
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        if self.public_url == default_public_url(&self.data_dir) {
            self.public_url = default_public_url(&data_dir);
        }
        self.data_dir = data_dir;
        self
    }
}

fn default_public_url(data_dir: &std::path::Path) -> String {
    format!("file://{}/objects", data_dir.display())
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

/// The local cache and the configured backend.
///
/// The only place a backend is chosen; the store just receives the adapter.
pub fn build_adapter(config: &TourConfig) -> (Arc<dyn TourCache>, Arc<dyn PersistenceAdapter>) {
    let cache: Arc<dyn TourCache> = Arc::new(FileTourCache::new(&config.data_dir, &config.cache_key));
    let adapter: Arc<dyn PersistenceAdapter> = match config.backend {
        Backend::Local => {
            Arc::new(LocalAdapter::new(Arc::clone(&cache)).with_image_options(config.image))
        }
        Backend::Remote => Arc::new(
            RemoteAdapter::new(DirRecordStore::new(&config.data_dir, &config.public_url))
                .with_image_options(config.image),
        ),
    };
    (cache, adapter)
}

pub fn build_auth(config: &TourConfig) -> LocalAuth {
    LocalAuth::new(config.admin.clone())
}
