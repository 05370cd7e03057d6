//! File-backed store: one file per key under a root directory.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::error::{StorageError, StorageResult};
use super::traits::KeyValueBackend;

const ENTRY_EXTENSION: &str = "kv";

/// Key-value backend persisting each entry as a file in `root`.
///
/// Writes go to a temporary file in the same directory followed by a rename,
/// so a crash mid-write never leaves a truncated entry behind.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Opens (creating if needed) a backend rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|err| map_write_err(&err))?;
        Ok(Self { root })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{ENTRY_EXTENSION}", encode_key(key)))
    }
}

impl KeyValueBackend for FileBackend {
    fn read(&self, key: String) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.entry_path(&key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Read(err.to_string())),
        }
    }

    fn write(&self, key: String, value: String) -> StorageResult<()> {
        let path = self.entry_path(&key);
        let tmp_path = self
            .root
            .join(format!(".{}.{}.tmp", encode_key(&key), Uuid::new_v4()));

        let result = (|| {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &path)
        })();

        if let Err(err) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(map_write_err(&err));
        }
        Ok(())
    }

    fn delete(&self, key: String) -> StorageResult<()> {
        match fs::remove_file(self.entry_path(&key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(map_write_err(&err)),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries =
            fs::read_dir(&self.root).map_err(|err| StorageError::Read(err.to_string()))?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StorageError::Read(err.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            if let Some(key) = decode_key(stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn map_write_err(err: &io::Error) -> StorageError {
    StorageError::Write(err.to_string())
}

/// Maps a key to a file-name-safe string. Alphanumerics, `-` and `_` pass
/// through, every other byte becomes `%XX`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
