//! File-based backend persisting tables as an append-only mutation log.
//!
//! ## Data file format
//!
//! The file is a sequence of frames:
//!
//! ```text
//! | len: u32 LE | payload: len bytes (CBOR mutation) | crc32: u32 LE |
//! ```
//!
//! The checksum covers the length field and the payload. On connect every
//! frame is replayed into memory. A frame cut short at the end of the file
//! (a torn write) is truncated away; a complete frame with a bad checksum is
//! corruption and fails the connect.

use crate::backend::Backend;
use crate::config::{BackendConfig, BackendKind, KEY_PATH, KEY_SYNC_ON_WRITE};
use crate::cursor::RowCursor;
use crate::desc::ObjectDesc;
use crate::error::{BackendError, BackendResult};
use crate::query::{ClauseList, JoinList};
use crate::table::{Mutation, TableStore};
use fs2::FileExt;
use objdb_value::{FieldList, Value, ValueSet};
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const LEN_SIZE: usize = 4;
const CRC_SIZE: usize = 4;

struct FileState {
    file: File,
    store: TableStore,
    size: u64,
}

/// A backend persisting every change to a data file.
///
/// Tables live in memory and are rebuilt from the data file on connect.
/// Each mutation is appended to the file before it is applied, so the file
/// is never behind what readers observe.
///
/// # Durability
///
/// With `sync_on_write = true` every append is followed by `sync_data`.
/// Otherwise data reaches the OS on every write and the disk on disconnect.
///
/// # Locking
///
/// The data file is locked exclusively while connected. A second backend on
/// the same file fails with [`BackendError::Locked`].
///
/// # Example
///
/// ```no_run
/// use objdb_backend::{Backend, BackendConfig, FileBackend};
///
/// let config = BackendConfig::file("contacts", "contacts.db").with("sync_on_write", "true");
/// let backend = FileBackend::connect(&config).unwrap();
/// backend.disconnect().unwrap();
/// ```
pub struct FileBackend {
    name: String,
    path: PathBuf,
    sync_on_write: bool,
    state: RwLock<Option<FileState>>,
}

impl FileBackend {
    /// Opens the data file at `path` with default settings.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::connect`].
    pub fn open(path: &Path) -> BackendResult<Self> {
        Self::connect(&BackendConfig::file("file", path))
    }

    /// Returns the path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of rows in `table`, or 0 when disconnected.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.state
            .read()
            .as_ref()
            .map_or(0, |s| s.store.row_count(table))
    }

    fn with_store<R>(&self, f: impl FnOnce(&TableStore) -> BackendResult<R>) -> BackendResult<R> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(BackendError::NotConnected)?;
        f(&state.store)
    }

    /// Plans a mutation, logs it, then applies it.
    fn mutate<P>(&self, plan: P) -> BackendResult<(Mutation, u64)>
    where
        P: FnOnce(&TableStore) -> BackendResult<Mutation>,
    {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(BackendError::NotConnected)?;
        let mutation = plan(&state.store)?;
        if mutation.is_noop() {
            return Ok((mutation, 0));
        }

        let frame = encode_frame(&mutation)?;
        append_frame(&mut state.file, state.size, &frame, self.sync_on_write)?;
        state.size += frame.len() as u64;

        let affected = state.store.apply(mutation.clone());
        debug!(bytes = frame.len(), affected, "appended mutation");
        Ok((mutation, affected))
    }
}

impl std::fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("sync_on_write", &self.sync_on_write)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// The data file as seen by [`append_frame`].
trait LogFile: Write + Seek {
    fn set_len(&mut self, len: u64) -> io::Result<()>;
    fn sync_data(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn sync_data(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }
}

/// Appends `frame` at `size`, the end of the valid log.
///
/// On failure the file is cut back to `size`, so no partial frame is left
/// for later appends to land behind.
fn append_frame<F: LogFile>(
    file: &mut F,
    size: u64,
    frame: &[u8],
    sync: bool,
) -> BackendResult<()> {
    let Err(err) = write_frame(file, size, frame, sync) else {
        return Ok(());
    };
    warn!(
        offset = size,
        bytes = frame.len(),
        error = %err,
        "append failed, rolling back"
    );
    if let Err(rollback) = truncate_to(file, size) {
        warn!(offset = size, error = %rollback, "rollback of failed append failed");
    }
    Err(err.into())
}

fn write_frame<F: LogFile>(file: &mut F, size: u64, frame: &[u8], sync: bool) -> io::Result<()> {
    file.seek(SeekFrom::Start(size))?;
    file.write_all(frame)?;
    if sync {
        file.sync_data()?;
    }
    Ok(())
}

fn truncate_to<F: LogFile>(file: &mut F, size: u64) -> io::Result<()> {
    file.set_len(size)?;
    file.seek(SeekFrom::Start(size))?;
    Ok(())
}

fn encode_frame(mutation: &Mutation) -> BackendResult<Vec<u8>> {
    let mut payload = Vec::new();
    ciborium::into_writer(mutation, &mut payload)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| BackendError::Encode(format!("record of {} bytes", payload.len())))?;

    let mut frame = Vec::with_capacity(LEN_SIZE + payload.len() + CRC_SIZE);
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);
    let crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());
    Ok(frame)
}

/// Decodes the frame at `offset`.
///
/// Returns `Ok(None)` if the bytes end before the frame does.
fn decode_frame(bytes: &[u8], offset: usize) -> BackendResult<Option<(Mutation, usize)>> {
    let rest = &bytes[offset..];
    if rest.len() < LEN_SIZE {
        return Ok(None);
    }
    let len = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
    let total = LEN_SIZE + len + CRC_SIZE;
    if rest.len() < total {
        return Ok(None);
    }

    let body_end = LEN_SIZE + len;
    let expected = u32::from_le_bytes([
        rest[body_end],
        rest[body_end + 1],
        rest[body_end + 2],
        rest[body_end + 3],
    ]);
    let actual = crc32fast::hash(&rest[..body_end]);
    if expected != actual {
        return Err(BackendError::ChecksumMismatch {
            offset: offset as u64,
            expected,
            actual,
        });
    }

    let mutation = ciborium::from_reader(&rest[LEN_SIZE..body_end]).map_err(|e| {
        BackendError::corrupted(format!("undecodable record at offset {offset}: {e}"))
    })?;
    Ok(Some((mutation, total)))
}

/// Rebuilds the tables from the data file.
///
/// Returns the store, the length of the valid prefix and the record count.
fn replay(bytes: &[u8]) -> BackendResult<(TableStore, usize, usize)> {
    let mut store = TableStore::new();
    let mut offset = 0;
    let mut records = 0;
    while offset < bytes.len() {
        let Some((mutation, len)) = decode_frame(bytes, offset)? else {
            break;
        };
        store.apply(mutation);
        offset += len;
        records += 1;
    }
    Ok((store, offset, records))
}

impl Backend for FileBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn connect(config: &BackendConfig) -> BackendResult<Self> {
        let kind = config.kind()?;
        if kind != BackendKind::File {
            return Err(BackendError::invalid_config(format!(
                "file backend cannot serve backend = {kind}"
            )));
        }
        let path = PathBuf::from(config.require(KEY_PATH)?);
        let sync_on_write = config.get_bool(KEY_SYNC_ON_WRITE, false)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        if file.try_lock_exclusive().is_err() {
            return Err(BackendError::Locked(path));
        }

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let (store, valid, records) = replay(&bytes)?;
        if valid < bytes.len() {
            warn!(
                path = %path.display(),
                discarded = bytes.len() - valid,
                "truncating torn record at end of data file"
            );
            file.set_len(valid as u64)?;
            file.sync_all()?;
        }
        info!(
            name = config.name(),
            path = %path.display(),
            records,
            tables = store.table_count(),
            "replayed data file"
        );

        Ok(Self {
            name: config.name().to_string(),
            path,
            sync_on_write,
            state: RwLock::new(Some(FileState {
                file,
                store,
                size: valid as u64,
            })),
        })
    }

    fn disconnect(&self) -> BackendResult<()> {
        let Some(state) = self.state.write().take() else {
            return Ok(());
        };
        state.file.sync_all()?;
        state.file.unlock()?;
        info!(
            name = %self.name,
            path = %self.path.display(),
            bytes = state.size,
            "disconnected file backend"
        );
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.read().is_some()
    }

    fn create(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: &ValueSet,
    ) -> BackendResult<Value> {
        let (mutation, _) = self.mutate(|store| store.plan_insert(desc, fields, values))?;
        Ok(mutation.generated_key())
    }

    fn read(
        &self,
        desc: &ObjectDesc<'_>,
        joins: Option<&JoinList>,
        clauses: Option<&ClauseList>,
    ) -> BackendResult<RowCursor> {
        self.with_store(|store| {
            let ids = store.matching_ids(desc, joins, clauses)?;
            Ok(RowCursor::from_rows(store.rows(desc, &ids)))
        })
    }

    fn update(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: &ValueSet,
        clauses: &ClauseList,
    ) -> BackendResult<u64> {
        let (_, affected) =
            self.mutate(|store| store.plan_update(desc, fields, values, clauses))?;
        Ok(affected)
    }

    fn delete(&self, desc: &ObjectDesc<'_>, clauses: &ClauseList) -> BackendResult<u64> {
        let (_, affected) = self.mutate(|store| store.plan_delete(desc, clauses))?;
        Ok(affected)
    }

    fn count(
        &self,
        desc: &ObjectDesc<'_>,
        joins: Option<&JoinList>,
        clauses: Option<&ClauseList>,
    ) -> BackendResult<u64> {
        self.with_store(|store| Ok(store.matching_ids(desc, joins, clauses)?.len() as u64))
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        if let Err(err) = self.disconnect() {
            warn!(path = %self.path.display(), error = %err, "failed to close data file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desc::BackendMeta;
    use crate::query::Clause;
    use objdb_value::{Field, ValueType};
    use tempfile::tempdir;

    fn schema() -> FieldList {
        FieldList::new()
            .with(Field::new("name", ValueType::Text).unwrap())
            .unwrap()
            .with(Field::new("year", ValueType::UInt32).unwrap())
            .unwrap()
    }

    fn add(backend: &FileBackend, name: &str, year: u32) -> Value {
        let fields = schema();
        let meta = BackendMeta::new();
        let desc = ObjectDesc::new("contacts", "id", &fields, &meta);
        backend
            .create(&desc, &fields, &vec![Value::text(name), Value::uint32(year)].into())
            .unwrap()
    }

    fn names(backend: &FileBackend) -> Vec<String> {
        let fields = schema();
        let meta = BackendMeta::new();
        let desc = ObjectDesc::new("contacts", "id", &fields, &meta);
        backend
            .read(&desc, None, None)
            .unwrap()
            .map(|row| row.unwrap()[0].to_text().unwrap())
            .collect()
    }

    #[test]
    fn frame_layout() {
        let mutation = Mutation::Delete {
            table: "t".to_string(),
            ids: vec![1, 2],
        };
        let frame = encode_frame(&mutation).unwrap();
        let len = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
        assert_eq!(frame.len(), LEN_SIZE + len + CRC_SIZE);

        let (decoded, used) = decode_frame(&frame, 0).unwrap().unwrap();
        assert_eq!(decoded, mutation);
        assert_eq!(used, frame.len());
        assert!(decode_frame(&frame[..frame.len() - 1], 0).unwrap().is_none());
    }

    #[test]
    fn data_survives_reconnect() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contacts.db");

        {
            let backend = FileBackend::open(&path).unwrap();
            assert_eq!(add(&backend, "Ann", 1970), Value::primary_key(1u64));
            add(&backend, "Ben", 1980);
            backend.disconnect().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(names(&backend), ["Ann", "Ben"]);
        assert_eq!(add(&backend, "Cid", 1990), Value::primary_key(3u64));
        assert_eq!(backend.row_count("contacts"), 3);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("data.db");
        let config = BackendConfig::file("t", &path).with("sync_on_write", "true");
        let backend = FileBackend::connect(&config).unwrap();
        add(&backend, "Ann", 1970);
        assert!(path.exists());
        assert_eq!(backend.path(), path);
    }

    #[test]
    fn second_connect_is_locked_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.db");
        let first = FileBackend::open(&path).unwrap();
        assert!(matches!(
            FileBackend::open(&path),
            Err(BackendError::Locked(_))
        ));
        first.disconnect().unwrap();
        assert!(FileBackend::open(&path).is_ok());
    }

    #[test]
    fn torn_tail_is_truncated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.db");
        {
            let backend = FileBackend::open(&path).unwrap();
            add(&backend, "Ann", 1970);
        }
        let intact = std::fs::metadata(&path).unwrap().len();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&[42, 0, 0, 0, 1, 2]).unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(names(&backend), ["Ann"]);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), intact);
    }

    #[test]
    fn checksum_mismatch_fails_connect() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.db");
        {
            let backend = FileBackend::open(&path).unwrap();
            add(&backend, "Ann", 1970);
        }
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[LEN_SIZE + 1] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            FileBackend::open(&path),
            Err(BackendError::ChecksumMismatch { offset: 0, .. })
        ));
    }

    #[test]
    fn zero_match_update_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.db");
        let backend = FileBackend::open(&path).unwrap();
        add(&backend, "Ann", 1970);
        let before = std::fs::metadata(&path).unwrap().len();

        let fields = schema();
        let meta = BackendMeta::new();
        let desc = ObjectDesc::new("contacts", "id", &fields, &meta);
        let affected = backend
            .update(
                &desc,
                &fields,
                &vec![Value::text("Zed"), Value::uint32(1)].into(),
                &Clause::equal("name", "Nobody").into(),
            )
            .unwrap();
        assert_eq!(affected, 0);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), before);
    }

    /// Passes `budget` bytes through to the file, then fails every write.
    struct ShortWrite {
        file: File,
        budget: usize,
    }

    impl Write for ShortWrite {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::other("disk full"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            self.file.write(&buf[..n])
        }

        fn flush(&mut self) -> io::Result<()> {
            self.file.flush()
        }
    }

    impl Seek for ShortWrite {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.file.seek(pos)
        }
    }

    impl LogFile for ShortWrite {
        fn set_len(&mut self, len: u64) -> io::Result<()> {
            self.file.set_len(len)
        }

        fn sync_data(&mut self) -> io::Result<()> {
            self.file.sync_data()
        }
    }

    #[test]
    fn failed_append_leaves_no_partial_frame() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.db");
        let backend = FileBackend::open(&path).unwrap();
        add(&backend, "Ann", 1970);
        let intact = std::fs::metadata(&path).unwrap().len();

        {
            let guard = backend.state.read();
            let state = guard.as_ref().unwrap();
            let frame = encode_frame(&Mutation::Delete {
                table: "contacts".to_string(),
                ids: vec![1],
            })
            .unwrap();
            let mut short = ShortWrite {
                file: state.file.try_clone().unwrap(),
                budget: 5,
            };
            let err = append_frame(&mut short, state.size, &frame, true).unwrap_err();
            assert!(matches!(err, BackendError::Io(_)));
        }
        assert_eq!(std::fs::metadata(&path).unwrap().len(), intact);

        add(&backend, "Ben", 1980);
        backend.disconnect().unwrap();
        drop(backend);

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(names(&backend), ["Ann", "Ben"]);
    }

    #[test]
    fn requires_path() {
        let config = BackendConfig::new("t").with("backend", "file");
        assert!(matches!(
            FileBackend::connect(&config),
            Err(BackendError::InvalidConfig(_))
        ));
    }
}
