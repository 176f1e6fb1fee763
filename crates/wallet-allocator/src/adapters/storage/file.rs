use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::adapters::lock::FileLock;
use crate::domain::config::{lock_path_for, LockWait};
use crate::domain::errors::{LockError, StoreError, StoreKind};
use crate::ports::outbound::RecordStore;

/// File-backed record store for production.
///
/// One UTF-8 line per record. The exclusive lock is taken on a
/// `<file>.lock` sidecar so that replacing the data file by rename never
/// invalidates a held lock. On unix, store files are created owner-only
/// (0600) by both the append and the rewrite path.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
    lock_path: PathBuf,
    kind: StoreKind,
}

impl FileRecordStore {
    /// Create a store at the given path. Nothing is touched on disk yet.
    pub fn new<P: AsRef<Path>>(path: P, kind: StoreKind) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            lock_path: lock_path_for(&path),
            path,
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn io_err(&self, op: &'static str) -> impl FnOnce(io::Error) -> StoreError {
        let kind = self.kind;
        move |source| StoreError::io(kind, op, source)
    }

    /// `true` if the file is non-empty and its last byte is not a newline,
    /// i.e. an earlier append was interrupted mid-line.
    fn missing_trailing_newline(file: &mut File) -> io::Result<bool> {
        if file.metadata()?.len() == 0 {
            return Ok(false);
        }
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }
}

impl RecordStore for FileRecordStore {
    type Guard<'a> = FileLock;

    fn kind(&self) -> StoreKind {
        self.kind
    }

    fn read_lines(&self) -> Result<Vec<String>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(kind = %self.kind, "store file does not exist yet, reading as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_err("open")(e)),
        };

        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(self.io_err("read"))?;
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    fn append_line(&self, line: &str) -> Result<(), StoreError> {
        debug_assert!(!line.contains('\n'), "record lines are single-line");

        let mut options = OpenOptions::new();
        options.read(true).append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(self.io_err("open"))?;

        let mut record = String::with_capacity(line.len() + 2);
        if Self::missing_trailing_newline(&mut file).map_err(self.io_err("read"))? {
            // Keep the torn fragment on its own line so it surfaces as malformed
            tracing::warn!(kind = %self.kind, "previous append was interrupted, starting a new line");
            record.push('\n');
        }
        record.push_str(line);
        record.push('\n');

        file.write_all(record.as_bytes())
            .map_err(self.io_err("append"))?;
        file.sync_all().map_err(self.io_err("fsync"))?;
        Ok(())
    }

    fn write_all_atomic(&self, lines: &[String]) -> Result<(), StoreError> {
        let mut contents = lines.join("\n");
        if !lines.is_empty() {
            contents.push('\n');
        }

        // Same directory, so the rename below never crosses a filesystem
        let mut temp = tempfile::Builder::new()
            .prefix(".tmp_")
            .tempfile_in(self.dir())
            .map_err(self.io_err("create temp file"))?;
        temp.write_all(contents.as_bytes())
            .map_err(self.io_err("write temp file"))?;
        temp.as_file()
            .sync_all()
            .map_err(self.io_err("fsync temp file"))?;

        // Dropping `temp` on any error above removes it
        temp.persist(&self.path)
            .map_err(|e| StoreError::io(self.kind, "rename", e.error))?;
        sync_dir(self.dir()).map_err(self.io_err("fsync directory"))?;

        tracing::debug!(kind = %self.kind, records = lines.len(), "store rewritten");
        Ok(())
    }

    fn lock_exclusive(&self, wait: LockWait) -> Result<Self::Guard<'_>, LockError> {
        FileLock::acquire(&self.lock_path, self.kind, wait)
    }
}

/// Make a completed rename durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
