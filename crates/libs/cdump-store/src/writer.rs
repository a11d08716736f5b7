//! Write-then-rename sink for a single artifact.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::{PathPersistError, TempPath};
use tracing::{debug, warn};

use crate::prelude::*;

/// Layers between the caller and the temporary file.
enum Sink {
    Plain(File),
    Gzip(GzEncoder<File>),
}

impl Sink {
    /// Flush every layer and hand back the underlying file.
    fn finish(self) -> io::Result<File> {
        match self {
            Sink::Plain(mut file) => {
                file.flush()?;
                Ok(file)
            }
            Sink::Gzip(encoder) => encoder.finish(),
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Plain(file) => file.write(buf),
            Sink::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Plain(file) => file.flush(),
            Sink::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// An artifact being written.
///
/// Bytes go to a hidden temporary file in the artifact's directory.
/// [`DumpWriter::commit`] moves it under the final name. Dropping the writer
/// without committing leaves the temporary file behind and the final path
/// untouched.
pub struct DumpWriter {
    sink: Option<Sink>,
    temp: Option<TempPath>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl DumpWriter {
    pub(crate) fn create(prefix: &str, final_path: PathBuf, compress: bool) -> Result<Self> {
        let dir = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Leading dot keeps it out of artifact listings.
        let prefix = format!(".{prefix}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Created as 0666, the kernel applies the umask.
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let (file, temp) = builder.tempfile_in(dir)?.into_parts();
        let temp_path = temp.to_path_buf();

        let sink = if compress {
            Sink::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            Sink::Plain(file)
        };
        debug!("Writing {} through {}", final_path.display(), temp_path.display());

        Ok(Self {
            sink: Some(sink),
            temp: Some(temp),
            temp_path,
            final_path,
            written: 0,
        })
    }

    /// Where the bytes are written until the dump is committed.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Bytes accepted so far, before compression.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Finish the artifact and move it under its final name.
    ///
    /// The move is a single no-replace rename within one directory. An
    /// existing artifact at the final path is never replaced, the dump fails
    /// with [`Error::ArtifactExists`] and the temporary file stays.
    pub fn commit(mut self) -> Result<PathBuf> {
        let (Some(sink), Some(temp)) = (self.sink.take(), self.temp.take()) else {
            return Err(io::Error::other("dump writer already finished").into());
        };
        let file = match sink.finish().and_then(|file| file.sync_all().map(|()| file)) {
            Ok(file) => file,
            Err(err) => {
                self.temp = Some(temp);
                return Err(err.into());
            }
        };
        drop(file);

        match temp.persist_noclobber(&self.final_path) {
            Ok(()) => Ok(self.final_path.clone()),
            Err(PathPersistError { error, path }) => {
                self.temp = Some(path);
                if error.kind() == io::ErrorKind::AlreadyExists {
                    Err(Error::ArtifactExists(self.final_path.clone()))
                } else {
                    Err(error.into())
                }
            }
        }
    }
}

impl Write for DumpWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| io::Error::other("dump writer already finished"))?;
        let n = sink.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for DumpWriter {
    fn drop(&mut self) {
        let Some(temp) = self.temp.take() else {
            return;
        };
        // Partial output is left for inspection.
        match temp.keep() {
            Ok(path) => warn!(
                "Abandoned dump for {}, partial output left in {}",
                self.final_path.display(),
                path.display()
            ),
            Err(err) => warn!(
                "Abandoned dump for {}, failed to keep {} - {}",
                self.final_path.display(),
                self.temp_path.display(),
                err.error
            ),
        }
    }
}
