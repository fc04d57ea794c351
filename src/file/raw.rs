//! Append-only writer and forward/reverse reader over one fixed-record
//! sub-stream backed by a file on disk (§4.1, §6).
//!
//! Every cursor here is a scoped resource per §5: the reader/writer borrows
//! the file for its own lifetime and never outlives it; flush/seek errors
//! are surfaced, never swallowed.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::file::record::Record;

/// Append-only writer for one sub-stream of fixed-size records.
pub struct RawWriter<T: Record> {
    path: PathBuf,
    inner: BufWriter<File>,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Record> RawWriter<T> {
    pub fn create(path: impl AsRef<Path>) -> Result<RawWriter<T>> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| Error::io(&path, e))?;
        Ok(RawWriter { path, inner: BufWriter::new(file), len: 0, _marker: PhantomData })
    }

    pub fn push(&mut self, record: T) -> Result<()> {
        let mut buf = vec![0u8; T::SIZE];
        record.encode(&mut buf);
        self.inner.write_all(&buf).map_err(|e| Error::io(&self.path, e))?;
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Flush and seal the stream, returning the number of records written.
    pub fn close(mut self) -> Result<usize> {
        self.inner.flush().map_err(|e| Error::io(&self.path, e))?;
        Ok(self.len)
    }
}

/// Forward- or reverse-reading cursor over one sub-stream of fixed-size
/// records (§4.1 "Stream (forward/reverse)").
pub struct RawReader<T: Record> {
    path: PathBuf,
    file: File,
    len: usize,
    fwd_idx: usize,
    rev_idx: usize,
    _marker: PhantomData<T>,
}

impl<T: Record> RawReader<T> {
    pub fn open(path: impl AsRef<Path>, len: usize) -> Result<RawReader<T>> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
        Ok(RawReader { path, file, len, fwd_idx: 0, rev_idx: len, _marker: PhantomData })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records left to pull, forward cursor.
    pub fn can_pull_fwd(&self) -> bool {
        self.fwd_idx < self.rev_idx
    }

    /// Records left to pull, reverse cursor.
    pub fn can_pull_rev(&self) -> bool {
        self.fwd_idx < self.rev_idx
    }

    fn read_at(&mut self, idx: usize) -> Result<T> {
        let offset = (idx * T::SIZE) as u64;
        self.file.seek(SeekFrom::Start(offset)).map_err(|e| Error::io(&self.path, e))?;
        let mut buf = vec![0u8; T::SIZE];
        self.file.read_exact(&mut buf).map_err(|e| Error::io(&self.path, e))?;
        Ok(T::decode(&buf))
    }

    pub fn pull_fwd(&mut self) -> Result<T> {
        let rec = self.read_at(self.fwd_idx)?;
        self.fwd_idx += 1;
        Ok(rec)
    }

    pub fn peek_fwd(&mut self) -> Result<T> {
        self.read_at(self.fwd_idx)
    }

    pub fn pull_rev(&mut self) -> Result<T> {
        self.rev_idx -= 1;
        self.read_at(self.rev_idx)
    }

    pub fn peek_rev(&mut self) -> Result<T> {
        self.read_at(self.rev_idx - 1)
    }

    /// Read every remaining forward record into memory (used by the
    /// in-memory sorter stage and by random-access level buffering, §4.1).
    pub fn drain_fwd(&mut self) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(self.rev_idx.saturating_sub(self.fwd_idx));
        while self.can_pull_fwd() {
            out.push(self.pull_fwd()?);
        }
        Ok(out)
    }
}

/// Read every record of a sealed sub-stream file without going through a
/// [`RawReader`] cursor (used by the external sorter to re-load spilled
/// runs).
pub fn read_all<T: Record>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| Error::io(path, e))?;
    Ok(bytes.chunks_exact(T::SIZE).map(T::decode).collect())
}

/// Write `records` to a fresh file at `path`, returning the count.
pub fn write_all<T: Record>(path: impl AsRef<Path>, records: &[T]) -> Result<usize> {
    let mut w = RawWriter::<T>::create(path)?;
    for r in records {
        w.push(*r)?;
    }
    w.close()
}
