//! Archive extraction for the downloaded generator package
//!
//! Only zip archives are understood. Any other suffix is accepted and
//! extracts nothing; callers find out when the executable is missing.

use crate::error::{ExtractEntrySnafu, OpenArchiveSnafu, ReadZipSnafu, Result};
use snafu::ResultExt;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// What [`extract_archive`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Zip archive unpacked; number of files written
    Unpacked(usize),
    /// Unrecognised archive format, nothing written
    Skipped,
}

/// Returns true when the file name ends in `.zip` (any case)
pub fn is_zip(archive_path: &Path) -> bool {
    archive_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Extract `archive_path` into `dest_dir`
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<Extraction> {
    if !is_zip(archive_path) {
        warn!(
            "No extractor for {}; nothing was unpacked",
            archive_path.display()
        );
        return Ok(Extraction::Skipped);
    }

    debug!(
        "Extracting {} to {}",
        archive_path.display(),
        dest_dir.display()
    );
    extract_zip(archive_path, dest_dir).map(Extraction::Unpacked)
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize> {
    fs::create_dir_all(dest_dir).context(ExtractEntrySnafu { path: dest_dir })?;

    let file = File::open(archive_path).context(OpenArchiveSnafu {
        path: archive_path,
    })?;
    let mut archive = zip::ZipArchive::new(file).context(ReadZipSnafu {
        path: archive_path,
    })?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).context(ReadZipSnafu {
            path: archive_path,
        })?;

        let Some(entry_path) = entry.enclosed_name() else {
            debug!("Skipping unsafe path in zip: {}", entry.name());
            continue;
        };
        let dest_path = dest_dir.join(entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path).context(ExtractEntrySnafu { path: &dest_path })?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).context(ExtractEntrySnafu { path: parent })?;
        }

        let mut outfile =
            File::create(&dest_path).context(ExtractEntrySnafu { path: &dest_path })?;
        io::copy(&mut entry, &mut outfile).context(ExtractEntrySnafu { path: &dest_path })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode))
                    .context(ExtractEntrySnafu { path: &dest_path })?;
            }
        }

        written += 1;
    }

    debug!("ZIP extraction complete: {} files", written);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, body) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_is_zip() {
        assert!(is_zip(Path::new("premake-5.0.0-beta7-windows.zip")));
        assert!(is_zip(Path::new("PREMAKE.ZIP")));
        assert!(!is_zip(Path::new("premake-linux.tar.gz")));
        assert!(!is_zip(Path::new("premake")));
    }

    #[test]
    fn test_extracts_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.zip");
        write_zip(
            &archive,
            &[("premake5.exe", b"MZ".as_slice()), ("docs/LICENSE.txt", b"BSD".as_slice())],
        );

        let dest = dir.path().join("premake");
        let outcome = extract_archive(&archive, &dest).unwrap();

        assert_eq!(outcome, Extraction::Unpacked(2));
        assert_eq!(fs::read(dest.join("premake5.exe")).unwrap(), b"MZ");
        assert_eq!(fs::read(dest.join("docs/LICENSE.txt")).unwrap(), b"BSD");
    }

    #[test]
    fn test_skips_escaping_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("../outside.txt", b"nope".as_slice()), ("inside.txt", b"ok".as_slice())]);

        let dest = dir.path().join("out");
        let outcome = extract_archive(&archive, &dest).unwrap();

        assert_eq!(outcome, Extraction::Unpacked(1));
        assert!(!dir.path().join("outside.txt").exists());
        assert!(dest.join("inside.txt").exists());
    }

    #[test]
    fn test_other_formats_are_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("premake-linux.tar.gz");
        fs::write(&archive, b"not really a tarball").unwrap();

        let dest = dir.path().join("premake");
        let outcome = extract_archive(&archive, &dest).unwrap();

        assert_eq!(outcome, Extraction::Skipped);
        assert!(!dest.exists());
    }

    #[test]
    fn test_corrupt_zip_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"PK but not really").unwrap();

        assert!(extract_archive(&archive, &dir.path().join("out")).is_err());
    }
}
