//! Append-only mutation log, one JSON object per line.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use coinstore_core::{Record, RecordId, StoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalEntry<R> {
    Save { record: R },
    Delete { id: RecordId },
}

pub struct Journal {
    path: PathBuf,
    file: File,
    sync_writes: bool,
    #[cfg(test)]
    fail_after: Option<usize>,
}

impl Journal {
    /// Opens the journal at `path`, creating it and its directory if needed.
    /// Returns the entries already present, each with its 1-based line number.
    ///
    /// An unterminated last line left by an interrupted append is dropped
    /// from the file when it does not parse.
    pub fn open<R: Record>(
        path: &Path,
        sync_writes: bool,
    ) -> Result<(Self, Vec<(usize, JournalEntry<R>)>), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries = if path.exists() {
            read_entries(path)?
        } else {
            Vec::new()
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok((
            Self {
                path: path.to_path_buf(),
                file,
                sync_writes,
                #[cfg(test)]
                fail_after: None,
            },
            entries,
        ))
    }

    /// Appends one line. On failure the file is cut back to its previous
    /// length so the next append starts on a fresh line.
    pub fn append<T: Serialize>(&mut self, entry: &JournalEntry<T>) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(entry)
            .map_err(|e| StoreError::Other(format!("failed to encode journal entry: {}", e)))?;
        line.push(b'\n');

        let len = self.file.metadata()?.len();
        if let Err(e) = self.write_line(&line) {
            if let Err(rollback) = self.file.set_len(len) {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "Failed to roll back a partial journal append"
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        #[cfg(test)]
        let fail_after = self.fail_after.take();
        #[cfg(not(test))]
        let fail_after: Option<usize> = None;

        if let Some(n) = fail_after {
            self.file.write_all(&line[..n.min(line.len())])?;
            return Err(io::Error::new(io::ErrorKind::WriteZero, "journal write interrupted"));
        }

        self.file.write_all(line)?;
        if self.sync_writes {
            self.file.sync_data()?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl Journal {
    /// A journal over a file opened for reading only, so every write fails.
    pub(crate) fn read_only(path: &Path) -> io::Result<Self> {
        OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: File::open(path)?,
            sync_writes: false,
            fail_after: None,
        })
    }

    /// Makes the next append write only `n` bytes before failing.
    pub(crate) fn fail_next_append_after(&mut self, n: usize) {
        self.fail_after = Some(n);
    }
}

fn read_entries<R: Record>(path: &Path) -> Result<Vec<(usize, JournalEntry<R>)>, StoreError> {
    let bytes = fs::read(path)?;
    let mut entries = Vec::new();
    let mut offset = 0;
    let mut number = 0;

    while offset < bytes.len() {
        number += 1;
        let rest = &bytes[offset..];
        let (line, next, terminated) = match rest.iter().position(|&b| b == b'\n') {
            Some(end) => (&rest[..end], offset + end + 1, true),
            None => (rest, bytes.len(), false),
        };

        if !line.iter().all(u8::is_ascii_whitespace) {
            match serde_json::from_slice::<JournalEntry<R>>(line) {
                Ok(entry) => {
                    entries.push((number, entry));
                    if !terminated {
                        OpenOptions::new().append(true).open(path)?.write_all(b"\n")?;
                    }
                }
                Err(e) if !terminated => {
                    tracing::warn!(
                        path = %path.display(),
                        line = number,
                        error = %e,
                        "Truncating torn journal tail"
                    );
                    OpenOptions::new().write(true).open(path)?.set_len(offset as u64)?;
                }
                Err(e) => {
                    return Err(StoreError::CorruptJournal {
                        path: path.to_path_buf(),
                        line: number,
                        reason: e.to_string(),
                    })
                }
            }
        }
        offset = next;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use coinstore_core::CryptoAsset;
    use time::macros::date;

    use super::*;

    fn ada() -> CryptoAsset {
        CryptoAsset::new("ADA_TESTE", "Cardano", "proof-of-stake", date!(2017 - 10 - 02))
    }

    #[test]
    fn entries_are_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("crypto_asset.log");

        let (mut journal, entries) = Journal::open::<CryptoAsset>(&path, true).unwrap();
        assert!(entries.is_empty());
        journal.append(&JournalEntry::Save { record: &ada() }).unwrap();
        journal
            .append(&JournalEntry::<&CryptoAsset>::Delete { id: RecordId::from("ADA_TESTE") })
            .unwrap();
        drop(journal);

        let (journal, entries) = Journal::open::<CryptoAsset>(&path, false).unwrap();
        assert_eq!(journal.path(), path.as_path());
        assert_eq!(
            entries,
            vec![
                (1, JournalEntry::Save { record: ada() }),
                (2, JournalEntry::Delete { id: RecordId::from("ADA_TESTE") }),
            ]
        );
    }

    #[test]
    fn lines_are_tagged_by_operation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_asset.log");

        let (mut journal, _) = Journal::open::<CryptoAsset>(&path, false).unwrap();
        journal
            .append(&JournalEntry::<&CryptoAsset>::Delete { id: RecordId::from("ETH_TESTE") })
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\"op\":\"delete\",\"id\":\"ETH_TESTE\"}\n");
    }

    #[test]
    fn corrupt_line_is_reported_with_its_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_asset.log");
        fs::write(&path, "{\"op\":\"delete\",\"id\":\"A\"}\n\nnot json\n").unwrap();

        match Journal::open::<CryptoAsset>(&path, false) {
            Err(StoreError::CorruptJournal { line, .. }) => assert_eq!(line, 3),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected a corrupt journal error"),
        }
    }

    #[test]
    fn torn_tail_is_truncated_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_asset.log");
        let eth = CryptoAsset::new("ETH_TESTE", "Ethereum", "", date!(2015 - 06 - 30));

        let (mut journal, _) = Journal::open::<CryptoAsset>(&path, false).unwrap();
        journal.append(&JournalEntry::Save { record: &ada() }).unwrap();
        journal.append(&JournalEntry::Save { record: &eth }).unwrap();
        drop(journal);
        let intact = fs::read(&path).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"op\":\"save\",\"record\":{\"code\":\"LINK_TE").unwrap();
        drop(file);

        let (mut journal, entries) = Journal::open::<CryptoAsset>(&path, false).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(fs::read(&path).unwrap(), intact);

        journal
            .append(&JournalEntry::<&CryptoAsset>::Delete { id: RecordId::from("ADA_TESTE") })
            .unwrap();
        drop(journal);

        let (_, entries) = Journal::open::<CryptoAsset>(&path, false).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2], (3, JournalEntry::Delete { id: RecordId::from("ADA_TESTE") }));
    }

    #[test]
    fn unterminated_valid_tail_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_asset.log");
        fs::write(&path, "{\"op\":\"delete\",\"id\":\"A\"}").unwrap();

        let (mut journal, entries) = Journal::open::<CryptoAsset>(&path, false).unwrap();
        assert_eq!(entries, vec![(1, JournalEntry::Delete { id: RecordId::from("A") })]);
        journal
            .append(&JournalEntry::<&CryptoAsset>::Delete { id: RecordId::from("B") })
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\"op\":\"delete\",\"id\":\"A\"}\n{\"op\":\"delete\",\"id\":\"B\"}\n");
    }

    #[test]
    fn failed_append_is_rolled_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_asset.log");

        let (mut journal, _) = Journal::open::<CryptoAsset>(&path, false).unwrap();
        journal.append(&JournalEntry::Save { record: &ada() }).unwrap();
        let len = fs::metadata(&path).unwrap().len();

        journal.fail_next_append_after(10);
        let err = journal
            .append(&JournalEntry::<&CryptoAsset>::Delete { id: RecordId::from("ADA_TESTE") })
            .unwrap_err();
        assert!(matches!(err, StoreError::IOError(_)));
        assert_eq!(fs::metadata(&path).unwrap().len(), len);

        journal
            .append(&JournalEntry::<&CryptoAsset>::Delete { id: RecordId::from("ETH_TESTE") })
            .unwrap();
        drop(journal);

        let (_, entries) = Journal::open::<CryptoAsset>(&path, false).unwrap();
        assert_eq!(
            entries,
            vec![
                (1, JournalEntry::Save { record: ada() }),
                (2, JournalEntry::Delete { id: RecordId::from("ETH_TESTE") }),
            ]
        );
    }
}
