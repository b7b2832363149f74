//! Configuration key names.

use crate::protocol::Protocol;

pub const CREATE_DOWNLOAD_DIRS: &str = "create.download.filepath";
pub const URL_FILE: &str = "download.url.filepath";
pub const OVERRIDE_EXISTING_FILE: &str = "override.existing.file";

pub const SFTP_SESSION_TIMEOUT_MILLIS: &str = "sftp.session.timeout.millis";
pub const SFTP_CHANNEL_TIMEOUT_MILLIS: &str = "sftp.channel.timeout.millis";
pub const SFTP_DEFAULT_PORT: &str = "sftp.default.port";

pub const RETRY_BACKOFF_MILLIS: &str = "retry.exponential.backoff.millis";
pub const RETRY_BACKOFF_MULTIPLIER: &str = "retry.exponential.backoff.multiplier";
pub const RETRY_MAX_DELAY_MILLIS: &str = "retry.max.delay.millis";
pub const RETRY_MAX_RETRIES: &str = "retry.max.retries";
pub const POOL_SIZE: &str = "scheduled.threadpool.core.size";

pub fn download_dir(protocol: Protocol) -> String {
    format!("{}.download.directory.path", protocol.key())
}

pub fn connect_timeout(protocol: Protocol) -> String {
    format!("{}.connection.timeout.millis", protocol.key())
}

pub fn read_timeout(protocol: Protocol) -> String {
    format!("{}.read.timeout.millis", protocol.key())
}

pub fn buffer_size(protocol: Protocol) -> String {
    format!("{}.buffer.size", protocol.key())
}
