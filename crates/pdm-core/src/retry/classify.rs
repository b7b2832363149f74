//! Classify server statuses and curl errors into retry policy error kinds.

use super::error::TransportError;
use super::policy::ErrorKind;

/// Classify a server status code for retry decisions.
pub fn classify_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Status5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// libcurl's CURLE_SSH: SSH session setup or transfer failure.
const CURLE_SSH: i64 = 79;

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    // A URL libcurl can't use is a failed connect, same as a bad session target.
    if e.is_couldnt_connect()
        || e.is_url_malformed()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_ssl_connect_error()
        || e.is_send_error()
        || e.code() as i64 == CURLE_SSH
    {
        return ErrorKind::Connection;
    }
    if e.is_partial_file()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_got_nothing()
        || e.is_bad_content_encoding()
    {
        return ErrorKind::Stream;
    }
    ErrorKind::Other
}

/// Classify a transfer error into an ErrorKind.
pub fn classify(e: &TransportError) -> ErrorKind {
    match e {
        TransportError::Curl(ce) => classify_curl_error(ce),
        TransportError::Status(code) => classify_status(*code),
        TransportError::Target { .. } => ErrorKind::Connection,
        TransportError::Storage(_)
        | TransportError::NoTransport(_)
        | TransportError::Aborted(_) => ErrorKind::Other,
    }
}
