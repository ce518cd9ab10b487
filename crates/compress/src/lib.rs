#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! bzip2 compression of single files
//!
//! Output is streamed into a `.partial` file beside the destination and only
//! renamed into place once the encoder has finished, so an interrupted run
//! never leaves a truncated archive under the final name.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_compression::tokio::write::BzEncoder;
use async_compression::Level;
use bubz2_errors::{CompressionError, Error, StorageError};
use bubz2_types::{CompressedFile, CompressionLevel};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, instrument};

/// Extension appended to every compressed file name
pub const EXTENSION: &str = "bz2";

/// Where the compressed copy of `relative` goes under `destination_root`
///
/// `.bz2` is appended to the whole file name, so `maps/a.bsp` becomes
/// `maps/a.bsp.bz2` and `README` becomes `README.bz2`.
#[must_use]
pub fn destination_path(destination_root: &Path, relative: &Path) -> PathBuf {
    let mut path = destination_root.join(relative);
    let mut file_name = path.file_name().map(OsString::from).unwrap_or_default();
    file_name.push(".");
    file_name.push(EXTENSION);
    path.set_file_name(file_name);
    path
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut file_name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    file_name.push(".partial");
    destination.with_file_name(file_name)
}

/// Compress `source` into `destination` with bzip2 at `level`.
///
/// The destination's parent directory must already exist.
///
/// # Errors
///
/// Returns an error if the source cannot be read or the destination cannot be
/// written, or if the finished output cannot be renamed over `destination`.
/// The partial output is removed in both cases.
#[instrument(level = "debug", skip_all, fields(source = %source.display()))]
pub async fn compress_file(
    source: &Path,
    destination: &Path,
    level: CompressionLevel,
) -> Result<CompressedFile, Error> {
    let partial = partial_path(destination);

    let bytes_in = match encode(source, &partial, level).await {
        Ok(bytes_in) => bytes_in,
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(CompressionError::EncodeFailed {
                source_path: source.display().to_string(),
                destination: destination.display().to_string(),
                message: e.to_string(),
            }
            .into());
        }
    };

    if let Err(e) = tokio::fs::rename(&partial, destination).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(StorageError::AtomicRenameFailed {
            from: partial.display().to_string(),
            to: destination.display().to_string(),
            message: e.to_string(),
        }
        .into());
    }

    let bytes_out = tokio::fs::metadata(destination)
        .await
        .map_err(|e| Error::io_with_path(&e, destination))?
        .len();

    debug!(
        destination = %destination.display(),
        bytes_in,
        bytes_out,
        level = %level,
        "compressed file"
    );

    Ok(CompressedFile {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        bytes_in,
        bytes_out,
    })
}

async fn encode(source: &Path, output: &Path, level: CompressionLevel) -> std::io::Result<u64> {
    let input = File::open(source).await?;
    let output = File::create(output).await?;

    let quality = Level::Precise(i32::try_from(level.bzip2_level()).unwrap_or(9));
    let mut encoder = BzEncoder::with_quality(BufWriter::new(output), quality);
    let mut reader = BufReader::new(input);
    let bytes_in = tokio::io::copy(&mut reader, &mut encoder).await?;

    // Flushes the bzip2 trailer and the buffered writer
    encoder.shutdown().await?;
    Ok(bytes_in)
}
