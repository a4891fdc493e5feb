//! Single-member extraction from downloaded tool packages.
//!
//! Only the member selected by a [`MemberSelector`] is written out; the rest
//! of the archive is skipped. The member lands at `<dest>.tmp` first and is
//! renamed into place once fully written.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use dlpro_core::{ArchiveFormat, MemberSelector, ProvisionError};
use tracing::debug;

use crate::cleanup::{TempPathGuard, replace_file, temp_sibling};

/// Extract the first file entry matching `selector` to `dest`.
///
/// Blocking; call from `spawn_blocking` in async contexts.
pub fn extract_member(
    archive_path: &Path,
    format: ArchiveFormat,
    selector: &MemberSelector,
    dest: &Path,
) -> Result<(), ProvisionError> {
    debug!(
        archive = %archive_path.display(),
        ?format,
        member = %selector,
        "extracting archive member"
    );

    let tmp = TempPathGuard::new(temp_sibling(dest));
    let found = {
        let mut out = File::create(tmp.path())?;
        let found = match format {
            ArchiveFormat::Zip => copy_zip_member(archive_path, selector, &mut out)?,
            ArchiveFormat::TarGz => {
                let decoder = flate2::read::GzDecoder::new(open(archive_path)?);
                copy_tar_member(decoder, selector, &mut out)?
            }
            ArchiveFormat::TarXz => {
                let decoder = xz2::read::XzDecoder::new(open(archive_path)?);
                copy_tar_member(decoder, selector, &mut out)?
            }
        };
        out.flush()?;
        found
    };

    let Some(entry_name) = found else {
        return Err(ProvisionError::missing_member(
            archive_path.display().to_string(),
            selector.to_string(),
        ));
    };

    replace_file(tmp.path(), dest)?;
    tmp.disarm();
    debug!(member = %entry_name, dest = %dest.display(), "archive member installed");
    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>, ProvisionError> {
    Ok(BufReader::new(File::open(path)?))
}

fn copy_zip_member(
    archive_path: &Path,
    selector: &MemberSelector,
    out: &mut File,
) -> Result<Option<String>, ProvisionError> {
    let mut archive = zip::ZipArchive::new(open(archive_path)?)
        .map_err(|e| ProvisionError::archive(format!("failed to read zip: {e}")))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ProvisionError::archive(format!("failed to read zip entry: {e}")))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if selector.matches(&name) {
            io::copy(&mut entry, out)?;
            return Ok(Some(name));
        }
    }

    Ok(None)
}

fn copy_tar_member<R: Read>(
    reader: R,
    selector: &MemberSelector,
    out: &mut File,
) -> Result<Option<String>, ProvisionError> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| ProvisionError::archive(format!("failed to read tar: {e}")))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| ProvisionError::archive(format!("failed to read tar entry: {e}")))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .map_err(|e| ProvisionError::archive(format!("invalid tar entry path: {e}")))?
            .to_string_lossy()
            .into_owned();
        if selector.matches(&name) {
            io::copy(&mut entry, out)?;
            return Ok(Some(name));
        }
    }

    Ok(None)
}
