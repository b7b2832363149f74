//! Typed settings snapshot, built once from a `ConfigProvider` and then
//! shared read-only by the planner, transports and scheduler.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::{keys, ConfigProvider, Setting};
use crate::protocol::Protocol;
use crate::retry::{Jitter, RetryPolicy};

/// Copy buffer size used when a protocol has none configured.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;
pub const DEFAULT_SFTP_PORT: u16 = 22;

/// Per-protocol tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolSettings {
    /// Destination directory; `None` means the protocol has no destination
    /// and its URLs are dropped during planning.
    pub download_dir: Option<PathBuf>,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub buffer_size: usize,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            download_dir: None,
            connect_timeout: None,
            read_timeout: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SftpSettings {
    pub session_timeout: Option<Duration>,
    pub channel_timeout: Option<Duration>,
    pub default_port: u16,
}

impl Default for SftpSettings {
    fn default() -> Self {
        Self {
            session_timeout: None,
            channel_timeout: None,
            default_port: DEFAULT_SFTP_PORT,
        }
    }
}

/// Immutable configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub url_file: Option<PathBuf>,
    pub create_missing_dirs: bool,
    pub override_existing: bool,
    pub protocols: BTreeMap<Protocol, ProtocolSettings>,
    pub sftp: SftpSettings,
    pub retry: RetryPolicy,
    pub pool_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url_file: None,
            create_missing_dirs: false,
            override_existing: false,
            protocols: Protocol::ALL
                .into_iter()
                .map(|p| (p, ProtocolSettings::default()))
                .collect(),
            sftp: SftpSettings::default(),
            retry: RetryPolicy::default(),
            pool_size: default_pool_size(),
        }
    }
}

impl Settings {
    /// Build the snapshot. Never fails: unusable values are logged and
    /// replaced by their fallback.
    pub fn from_provider(cfg: &dyn ConfigProvider) -> Self {
        let defaults = Settings::default();

        let protocols = Protocol::ALL
            .into_iter()
            .map(|p| (p, protocol_settings(cfg, p)))
            .collect();

        let sftp = SftpSettings {
            session_timeout: millis(cfg, keys::SFTP_SESSION_TIMEOUT_MILLIS),
            channel_timeout: millis(cfg, keys::SFTP_CHANNEL_TIMEOUT_MILLIS),
            default_port: match cfg.integer(keys::SFTP_DEFAULT_PORT) {
                Setting::Set(p) => u16::try_from(p)
                    .ok()
                    .filter(|p| *p > 0)
                    .map_or(
                        Setting::Invalid { raw: p.to_string() },
                        Setting::Set,
                    ),
                other => other.map(|_| DEFAULT_SFTP_PORT),
            }
            .or_fallback(keys::SFTP_DEFAULT_PORT, DEFAULT_SFTP_PORT),
        };

        let base = defaults.retry;
        let retry = RetryPolicy {
            base_delay: millis(cfg, keys::RETRY_BACKOFF_MILLIS).unwrap_or(base.base_delay),
            multiplier: at_least_one(cfg.float(keys::RETRY_BACKOFF_MULTIPLIER))
                .or_fallback(keys::RETRY_BACKOFF_MULTIPLIER, base.multiplier),
            max_delay: millis(cfg, keys::RETRY_MAX_DELAY_MILLIS).unwrap_or(base.max_delay),
            max_retries: cfg
                .integer(keys::RETRY_MAX_RETRIES)
                .or_fallback(keys::RETRY_MAX_RETRIES, u64::from(base.max_retries))
                .min(u64::from(u32::MAX)) as u32,
            jitter: Jitter::Uniform,
        };

        let pool_size = match cfg.integer(keys::POOL_SIZE).or_fallback(keys::POOL_SIZE, 0) {
            0 => defaults.pool_size,
            n => usize::try_from(n).unwrap_or(defaults.pool_size),
        };

        Settings {
            url_file: cfg.string(keys::URL_FILE).value().map(PathBuf::from),
            create_missing_dirs: cfg
                .boolean(keys::CREATE_DOWNLOAD_DIRS)
                .or_fallback(keys::CREATE_DOWNLOAD_DIRS, false),
            override_existing: cfg
                .boolean(keys::OVERRIDE_EXISTING_FILE)
                .or_fallback(keys::OVERRIDE_EXISTING_FILE, false),
            protocols,
            sftp,
            retry,
            pool_size,
        }
    }

    pub fn protocol(&self, protocol: Protocol) -> ProtocolSettings {
        self.protocols.get(&protocol).cloned().unwrap_or_default()
    }

    pub fn download_dir(&self, protocol: Protocol) -> Option<&PathBuf> {
        self.protocols
            .get(&protocol)
            .and_then(|p| p.download_dir.as_ref())
    }
}

fn protocol_settings(cfg: &dyn ConfigProvider, protocol: Protocol) -> ProtocolSettings {
    let buffer_key = keys::buffer_size(protocol);
    ProtocolSettings {
        download_dir: cfg
            .string(&keys::download_dir(protocol))
            .value()
            .map(PathBuf::from),
        connect_timeout: millis(cfg, &keys::connect_timeout(protocol)),
        read_timeout: millis(cfg, &keys::read_timeout(protocol)),
        buffer_size: match cfg.integer(&buffer_key).or_fallback(&buffer_key, 0) {
            0 => DEFAULT_BUFFER_SIZE,
            n => usize::try_from(n).unwrap_or(DEFAULT_BUFFER_SIZE),
        },
    }
}

/// Millisecond timeout; unset, invalid or `0` all mean "no timeout".
fn millis(cfg: &dyn ConfigProvider, key: &str) -> Option<Duration> {
    let ms = cfg.integer(key).or_fallback(key, 0);
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Backoff multiplier; below 1 the delays would shrink between retries.
fn at_least_one(s: Setting<f64>) -> Setting<f64> {
    match s {
        Setting::Set(v) if v < 1.0 => Setting::Invalid { raw: v.to_string() },
        other => other,
    }
}

fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
