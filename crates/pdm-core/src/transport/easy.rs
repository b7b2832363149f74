//! HTTP, HTTPS and FTP over libcurl.

use curl::easy::Easy;
use std::io;
use std::path::Path;
use std::time::Duration;

use super::guard::PartialFile;
use super::Transport;
use crate::config::ProtocolSettings;
use crate::protocol::Protocol;
use crate::retry::TransportError;
use crate::task::DownloadTask;

/// libcurl accepts receive buffers in this range.
const MIN_RECV_BUFFER: usize = 1024;
const MAX_RECV_BUFFER: usize = 512 * 1024;

/// Transport for the protocols libcurl speaks natively with no extra setup.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    protocol: Protocol,
    settings: ProtocolSettings,
}

impl CurlTransport {
    pub fn new(protocol: Protocol, settings: ProtocolSettings) -> Self {
        Self { protocol, settings }
    }

    fn is_http(&self) -> bool {
        matches!(self.protocol, Protocol::Http | Protocol::Https)
    }
}

impl Transport for CurlTransport {
    fn fetch(&self, task: &DownloadTask) -> Result<u64, TransportError> {
        let mut easy = Easy::new();
        easy.url(task.url())?;
        if self.is_http() {
            easy.follow_location(true)?;
            easy.max_redirections(10)?;
        }
        apply_limits(
            &mut easy,
            self.settings.connect_timeout,
            self.settings.read_timeout,
            self.settings.buffer_size,
        )?;

        let file = receive(&mut easy, task.destination(), self.settings.buffer_size)?;

        if self.is_http() {
            let code = easy.response_code()?;
            if code >= 400 {
                return Err(TransportError::Status(code));
            }
        }
        file.commit().map_err(TransportError::Storage)
    }
}

/// Connect timeout, stall timeout and receive buffer shared by every curl
/// based transport. A stall is less than one byte per second for `stall`.
pub(super) fn apply_limits(
    easy: &mut Easy,
    connect: Option<Duration>,
    stall: Option<Duration>,
    buffer_size: usize,
) -> Result<(), curl::Error> {
    if let Some(t) = connect {
        easy.connect_timeout(t)?;
    }
    if let Some(t) = stall {
        easy.low_speed_limit(1)?;
        easy.low_speed_time(t.max(Duration::from_secs(1)))?;
    }
    easy.buffer_size(buffer_size.clamp(MIN_RECV_BUFFER, MAX_RECV_BUFFER))?;
    Ok(())
}

/// Perform the transfer configured on `easy`, streaming the body into a
/// guarded file at `dest`. The caller validates the response and commits.
pub(super) fn receive(
    easy: &mut Easy,
    dest: &Path,
    buffer_size: usize,
) -> Result<PartialFile, TransportError> {
    let mut file = PartialFile::new(dest, buffer_size);
    let mut write_error: Option<io::Error> = None;

    let result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                write_error = Some(e);
                // Short write aborts the transfer.
                Ok(0)
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = result {
        if e.is_write_error() {
            if let Some(io_err) = write_error {
                return Err(TransportError::Storage(io_err));
            }
        }
        return Err(TransportError::Curl(e));
    }
    Ok(file)
}
