//! Configuration: a read-only key/value provider plus the typed `Settings`
//! snapshot built from it once at startup.
//!
//! Keys are dotted names (`http.download.directory.path`). The on-disk format
//! is TOML; nested tables flatten to dotted keys, so both
//! `http.download.directory.path = "/srv/http"` and a
//! `[http.download.directory]` table with `path = "/srv/http"` work.

pub mod keys;
mod settings;

pub use settings::{ProtocolSettings, Settings, SftpSettings};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot locate config directory: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("cannot write default config {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a typed lookup. Keeps "not configured" apart from "configured
/// but unusable" so callers never mistake a typo for a real `0`.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting<T> {
    Set(T),
    Unset,
    Invalid { raw: String },
}

impl<T> Setting<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Setting::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Setting<U> {
        match self {
            Setting::Set(v) => Setting::Set(f(v)),
            Setting::Unset => Setting::Unset,
            Setting::Invalid { raw } => Setting::Invalid { raw },
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Setting::Set(_))
    }

    /// The configured value, or `fallback` when unset or invalid (invalid is logged).
    pub fn or_fallback(self, key: &str, fallback: T) -> T {
        match self {
            Setting::Set(v) => v,
            Setting::Unset => fallback,
            Setting::Invalid { raw } => {
                tracing::warn!(key, raw = %raw, "ignoring unparsable config value");
                fallback
            }
        }
    }

    fn parse_with<E>(raw: Option<&str>, parse: impl FnOnce(&str) -> Result<T, E>) -> Setting<T> {
        match raw.map(str::trim) {
            None | Some("") => Setting::Unset,
            Some(s) => parse(s).map_or_else(
                |_| Setting::Invalid { raw: s.to_string() },
                Setting::Set,
            ),
        }
    }
}

/// Read-only key/value configuration source.
pub trait ConfigProvider {
    /// Raw string value for `key`, if present.
    fn raw(&self, key: &str) -> Option<&str>;

    fn string(&self, key: &str) -> Setting<String> {
        Setting::parse_with(self.raw(key.trim()), |s| Ok::<_, ()>(s.to_string()))
    }

    fn boolean(&self, key: &str) -> Setting<bool> {
        Setting::parse_with(self.raw(key.trim()), |s| {
            if s.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if s.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(())
            }
        })
    }

    fn integer(&self, key: &str) -> Setting<u64> {
        Setting::parse_with(self.raw(key.trim()), str::parse::<u64>)
    }

    fn float(&self, key: &str) -> Setting<f64> {
        Setting::parse_with(self.raw(key.trim()), |s| {
            s.parse::<f64>()
                .map_err(|_| ())
                .and_then(|v| if v.is_finite() { Ok(v) } else { Err(()) })
        })
    }
}

/// In-memory property map; the concrete `ConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    values: BTreeMap<String, String>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut store = Self::new();
        for (k, v) in pairs {
            store.set(k, v);
        }
        store
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into().trim().to_string(), value.into());
    }

    /// Parse a TOML document, flattening nested tables into dotted keys.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(text)?;
        let mut store = Self::new();
        flatten_into(&mut store.values, None, &table);
        Ok(store)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigProvider for PropertyStore {
    fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: Option<&str>, table: &toml::Table) {
    for (k, v) in table {
        let key = match prefix {
            Some(p) => format!("{p}.{k}"),
            None => k.clone(),
        };
        match v {
            toml::Value::Table(t) => flatten_into(out, Some(&key), t),
            toml::Value::String(s) => {
                out.insert(key, s.clone());
            }
            toml::Value::Integer(i) => {
                out.insert(key, i.to_string());
            }
            toml::Value::Float(f) => {
                out.insert(key, f.to_string());
            }
            toml::Value::Boolean(b) => {
                out.insert(key, b.to_string());
            }
            toml::Value::Array(_) | toml::Value::Datetime(_) => {
                tracing::warn!(key = %key, "ignoring non-scalar config value");
            }
        }
    }
}

/// Commented template written on first run.
pub const DEFAULT_CONFIG: &str = r#"# pdm configuration. Unset numeric values fall back to built-in defaults.

# File with one URL per line.
# download.url.filepath = "/home/user/urls.txt"

create.download.filepath = true
override.existing.file = false

http.download.directory.path = "downloads/http"
https.download.directory.path = "downloads/https"
ftp.download.directory.path = "downloads/ftp"
sftp.download.directory.path = "downloads/sftp"

http.connection.timeout.millis = 10000
http.read.timeout.millis = 30000
http.buffer.size = 65536
https.connection.timeout.millis = 10000
https.read.timeout.millis = 30000
https.buffer.size = 65536
ftp.connection.timeout.millis = 10000
ftp.read.timeout.millis = 30000
ftp.buffer.size = 65536

sftp.session.timeout.millis = 10000
sftp.channel.timeout.millis = 30000
sftp.buffer.size = 65536
sftp.default.port = 22

retry.exponential.backoff.millis = 250
retry.exponential.backoff.multiplier = 2
retry.max.delay.millis = 30000
retry.max.retries = 3

# Keep buffer.size * threadpool size under the memory you can spare.
scheduled.threadpool.core.size = 4
"#;

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pdm")?;
    xdg_dirs
        .place_config_file("config.toml")
        .map_err(|source| ConfigError::Init {
            path: xdg_dirs.get_config_home(),
            source,
        })
}

/// Load the default config file, writing the template first if none exists.
pub fn load_or_init() -> Result<PropertyStore, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Init {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, DEFAULT_CONFIG).map_err(|source| ConfigError::Init {
            path: path.clone(),
            source,
        })?;
        tracing::info!("created default config at {}", path.display());
    }
    PropertyStore::load_from_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_parses() {
        let store = PropertyStore::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(store.raw("http.buffer.size"), Some("65536"));
        assert_eq!(store.boolean(keys::CREATE_DOWNLOAD_DIRS), Setting::Set(true));
        assert_eq!(store.boolean(keys::OVERRIDE_EXISTING_FILE), Setting::Set(false));
        assert_eq!(store.string(keys::URL_FILE), Setting::Unset);
    }

    #[test]
    fn nested_tables_flatten_to_dotted_keys() {
        let toml = r#"
            [ftp.download.directory]
            path = "/srv/ftp"

            [retry]
            max.retries = 5
            exponential.backoff.multiplier = 1.5
        "#;
        let store = PropertyStore::from_toml_str(toml).unwrap();
        assert_eq!(store.raw("ftp.download.directory.path"), Some("/srv/ftp"));
        assert_eq!(store.integer(keys::RETRY_MAX_RETRIES), Setting::Set(5));
        assert_eq!(store.float(keys::RETRY_BACKOFF_MULTIPLIER), Setting::Set(1.5));
    }

    #[test]
    fn typed_lookups_distinguish_unset_from_invalid() {
        let store = PropertyStore::from_pairs([
            ("a.num", "12"),
            ("b.num", "twelve"),
            ("c.num", "  "),
            ("flag", "TRUE"),
            ("bad.flag", "yes"),
        ]);
        assert_eq!(store.integer("a.num"), Setting::Set(12));
        assert_eq!(
            store.integer("b.num"),
            Setting::Invalid {
                raw: "twelve".to_string()
            }
        );
        assert_eq!(store.integer("c.num"), Setting::Unset);
        assert_eq!(store.integer("missing"), Setting::Unset);
        assert_eq!(store.boolean("flag"), Setting::Set(true));
        assert!(matches!(store.boolean("bad.flag"), Setting::Invalid { .. }));
        assert_eq!(store.integer(" a.num "), Setting::Set(12));
    }

    #[test]
    fn negative_numbers_are_invalid() {
        let store = PropertyStore::from_toml_str("retry.max.retries = -1").unwrap();
        assert!(matches!(
            store.integer(keys::RETRY_MAX_RETRIES),
            Setting::Invalid { .. }
        ));
        assert_eq!(store.integer(keys::RETRY_MAX_RETRIES).or_fallback("k", 3), 3);
    }

    #[test]
    fn load_from_missing_path_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PropertyStore::load_from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_from_path_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "http.buffer.size = = 3").unwrap();
        let err = PropertyStore::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
