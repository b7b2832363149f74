//! RAII guard that removes an unfinished download when dropped.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination file of one attempt.
///
/// The file is created on the first write (or on commit, for an empty body),
/// so an attempt that never receives data leaves the destination untouched.
/// Unless [`PartialFile::commit`] succeeds, dropping the guard removes
/// whatever it created, on error returns and on panics alike.
#[derive(Debug)]
pub struct PartialFile {
    path: PathBuf,
    buffer_size: usize,
    writer: Option<BufWriter<File>>,
    written: u64,
    committed: bool,
}

impl PartialFile {
    pub fn new(path: &Path, buffer_size: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            buffer_size: buffer_size.max(1),
            writer: None,
            written: 0,
            committed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer()?.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Flush and sync; the file now stays on disk. Returns bytes written.
    pub fn commit(mut self) -> io::Result<u64> {
        let writer = self.writer()?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        self.committed = true;
        Ok(self.written)
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => BufWriter::with_capacity(self.buffer_size, File::create(&self.path)?),
        };
        Ok(self.writer.insert(writer))
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let Some(writer) = self.writer.take() else {
            return;
        };
        // Close before unlinking.
        drop(writer.into_inner());
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed partial file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove partial file")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn dropped_guard_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.bin");
        {
            let mut g = PartialFile::new(&path, 16);
            g.write(b"partial").unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn committed_file_stays() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.bin");
        let mut g = PartialFile::new(&path, 4);
        g.write(b"hello ").unwrap();
        g.write(b"world").unwrap();
        assert_eq!(g.commit().unwrap(), 11);
        assert_eq!(fs::read(&path).unwrap(), b"hello world");
    }

    #[test]
    fn empty_body_commit_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty");
        let g = PartialFile::new(&path, 8);
        assert_eq!(g.commit().unwrap(), 0);
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn untouched_destination_survives_failed_attempt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keep.txt");
        fs::write(&path, b"previous").unwrap();
        drop(PartialFile::new(&path, 8));
        assert_eq!(fs::read(&path).unwrap(), b"previous");
    }

    #[test]
    fn removed_on_panic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.bin");
        let p = path.clone();
        let res = std::panic::catch_unwind(move || {
            let mut g = PartialFile::new(&p, 8);
            g.write(b"x").unwrap();
            panic!("boom");
        });
        assert!(res.is_err());
        assert!(!path.exists());
    }
}
