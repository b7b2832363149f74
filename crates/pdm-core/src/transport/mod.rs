//! Byte transfer per protocol, selected through a registry.
//!
//! A [`Transport`] moves one task's bytes to its destination. Whatever the
//! outcome, a failed fetch leaves nothing at the destination: every
//! implementation writes through a [`PartialFile`] guard.

mod easy;
mod guard;
mod sftp;

pub use easy::CurlTransport;
pub use guard::PartialFile;
pub use sftp::SftpTransport;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::Settings;
use crate::protocol::Protocol;
use crate::retry::TransportError;
use crate::task::DownloadTask;

/// Protocol-specific transfer of one task.
///
/// `fetch` blocks for the whole transfer and returns the number of bytes
/// written. On `Err` the destination holds no partial data.
pub trait Transport: Send + Sync {
    fn fetch(&self, task: &DownloadTask) -> Result<u64, TransportError>;
}

/// Maps protocols to the transport that serves them.
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: BTreeMap<Protocol, Arc<dyn Transport>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in transports for every protocol, configured
    /// from `settings`.
    pub fn with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();
        for protocol in [Protocol::Http, Protocol::Https, Protocol::Ftp] {
            registry.register(
                protocol,
                Arc::new(CurlTransport::new(protocol, settings.protocol(protocol))),
            );
        }
        registry.register(
            Protocol::Sftp,
            Arc::new(SftpTransport::new(
                settings.sftp.clone(),
                settings.protocol(Protocol::Sftp).buffer_size,
            )),
        );
        registry
    }

    /// Register (or replace) the transport for `protocol`.
    pub fn register(&mut self, protocol: Protocol, transport: Arc<dyn Transport>) {
        self.transports.insert(protocol, transport);
    }

    pub fn for_protocol(&self, protocol: Protocol) -> Option<Arc<dyn Transport>> {
        self.transports.get(&protocol).cloned()
    }

    pub fn protocols(&self) -> impl Iterator<Item = Protocol> + '_ {
        self.transports.keys().copied()
    }
}

impl fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.protocols()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u64);

    impl Transport for Fixed {
        fn fetch(&self, _task: &DownloadTask) -> Result<u64, TransportError> {
            Ok(self.0)
        }
    }

    #[test]
    fn defaults_cover_every_protocol() {
        let registry = TransportRegistry::with_defaults(&Settings::default());
        let protocols: Vec<_> = registry.protocols().collect();
        assert_eq!(protocols, Protocol::ALL.to_vec());
    }

    #[test]
    fn register_replaces_and_lookup_misses() {
        let mut registry = TransportRegistry::new();
        assert!(registry.for_protocol(Protocol::Ftp).is_none());

        registry.register(Protocol::Ftp, Arc::new(Fixed(1)));
        registry.register(Protocol::Ftp, Arc::new(Fixed(2)));
        let task = DownloadTask::new("ftp://h/a", Protocol::Ftp, "/tmp/a".into());
        let got = registry.for_protocol(Protocol::Ftp).unwrap().fetch(&task).unwrap();
        assert_eq!(got, 2);
        assert!(registry.for_protocol(Protocol::Http).is_none());
    }
}
