//! Decompressing line source
//!
//! Streams lines out of a gzip-compressed text file without buffering the
//! whole file. The file handle lives as long as the source and is released
//! when it is dropped.

use crate::{LoadError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// gzip member header magic
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read buffer for the decompressed stream (1MB)
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Lazy, forward-only iterator over the lines of a gzip file
pub struct GzipLineSource {
    reader: BufReader<MultiGzDecoder<File>>,
    lines_read: u64,
    done: bool,
}

impl GzipLineSource {
    /// Open a gzip file for line iteration.
    ///
    /// Fails with [`LoadError::OpenInput`] if the file cannot be opened and
    /// with [`LoadError::InputFormat`] if it does not start with a valid
    /// gzip header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|source| LoadError::OpenInput {
            path: path.to_path_buf(),
            source,
        })?;

        Self::check_magic(path, &mut file)?;

        // Decode the first block so a broken header fails here, not mid-run
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, MultiGzDecoder::new(file));
        reader.fill_buf().map_err(|e| LoadError::InputFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            reader,
            lines_read: 0,
            done: false,
        })
    }

    /// Number of lines yielded so far
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    fn check_magic(path: &Path, file: &mut File) -> Result<()> {
        let mut magic = [0u8; 2];
        match file.read_exact(&mut magic) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(LoadError::InputFormat {
                    path: path.to_path_buf(),
                    reason: "file is shorter than a gzip header".to_string(),
                });
            }
            Err(source) => {
                return Err(LoadError::OpenInput {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        if magic != GZIP_MAGIC {
            return Err(LoadError::InputFormat {
                path: path.to_path_buf(),
                reason: format!("bad magic bytes {:02x} {:02x}", magic[0], magic[1]),
            });
        }

        file.seek(SeekFrom::Start(0))
            .map_err(|source| LoadError::OpenInput {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

impl Iterator for GzipLineSource {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_line() {
            Ok(Some(line)) => {
                self.lines_read += 1;
                Some(Ok(line))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(source) => {
                // A corrupt stream cannot be resynchronized
                self.done = true;
                Some(Err(LoadError::ReadInput {
                    line: self.lines_read + 1,
                    source,
                }))
            }
        }
    }
}
