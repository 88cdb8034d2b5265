//! Archive extraction
//!
//! Supports gzip-compressed tarballs and plain tarballs, detected by their
//! magic bytes rather than the file name, since cached artifacts keep
//! whatever name the download URI had.

use crate::error::{StarknetError, StarknetResult};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC: &[u8; 5] = b"ustar";

/// Extract `archive` into `dest`, dropping `strip_components` leading path
/// components from every entry.
pub async fn extract(archive: &Path, dest: &Path, strip_components: usize) -> StarknetResult<()> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || extract_blocking(&archive, &dest, strip_components))
        .await
        .map_err(|e| StarknetError::Internal(format!("extract task failed: {e}")))?
}

fn extract_blocking(archive: &Path, dest: &Path, strip_components: usize) -> StarknetResult<()> {
    let io_err = |e| StarknetError::io(format!("reading {}", archive.display()), e);

    let mut file = File::open(archive).map_err(io_err)?;
    let mut header = [0u8; TAR_MAGIC_OFFSET + 5];
    let read = read_up_to(&mut file, &mut header).map_err(io_err)?;
    file.seek(SeekFrom::Start(0)).map_err(io_err)?;

    fs::create_dir_all(dest)
        .map_err(|e| StarknetError::io(format!("creating {}", dest.display()), e))?;

    if read >= 2 && header[..2] == GZIP_MAGIC {
        debug!("Extracting gzip tarball {}", archive.display());
        unpack(
            Archive::new(GzDecoder::new(BufReader::new(file))),
            archive,
            dest,
            strip_components,
        )
    } else if read == header.len() && &header[TAR_MAGIC_OFFSET..] == TAR_MAGIC {
        debug!("Extracting tarball {}", archive.display());
        unpack(
            Archive::new(BufReader::new(file)),
            archive,
            dest,
            strip_components,
        )
    } else {
        Err(StarknetError::UnsupportedArchive(archive.to_path_buf()))
    }
}

fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..])? {
            0 => break,
            n => total += n,
        }
    }
    Ok(total)
}

fn unpack<R: Read>(
    mut archive: Archive<R>,
    source: &Path,
    dest: &Path,
    strip_components: usize,
) -> StarknetResult<()> {
    let io_err = |e| StarknetError::io(format!("expanding {}", source.display()), e);

    for entry in archive.entries().map_err(io_err)? {
        let mut entry = entry.map_err(io_err)?;
        let path = entry.path().map_err(io_err)?.into_owned();

        let Some(relative) = strip(&path, strip_components)? else {
            continue;
        };
        let target = dest.join(&relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StarknetError::io(format!("creating {}", parent.display()), e))?;
        }
        entry
            .unpack(&target)
            .map_err(|e| StarknetError::io(format!("writing {}", target.display()), e))?;
    }

    Ok(())
}

/// Drop leading components and reject anything that could escape `dest`
fn strip(path: &Path, strip_components: usize) -> StarknetResult<Option<PathBuf>> {
    let mut stripped = PathBuf::new();
    let components = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .skip(strip_components);
    for component in components {
        match component {
            Component::Normal(part) => stripped.push(part),
            _ => {
                return Err(StarknetError::ArchiveEntryUnsafe(
                    path.display().to_string(),
                ))
            }
        }
    }

    if stripped.as_os_str().is_empty() {
        Ok(None)
    } else {
        Ok(Some(stripped))
    }
}
