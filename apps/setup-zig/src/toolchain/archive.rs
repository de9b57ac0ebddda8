//! Archive extraction for downloaded toolchains.
//!
//! Zig ships `.tar.xz` archives for Unix hosts and `.zip` archives for
//! Windows. Both contain a single top-level directory named after the
//! artifact, which is kept as-is: callers locate it by name afterwards.

use std::io::Read;
use std::path::{Component, Path};

use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use setup_zig_versions::ArchiveKind;
use tar::Archive;
use tracing::debug;
use xz2::read::XzDecoder;

/// Extracts an archive into `dest_dir` using the format of `kind`.
///
/// # Errors
///
/// Returns an error if the archive cannot be read, is corrupt, or contains
/// entries that would escape `dest_dir`.
pub fn extract_archive(archive_path: &Path, kind: ArchiveKind, dest_dir: &Path) -> Result<()> {
    debug!(archive = %archive_path.display(), dest = %dest_dir.display(), ?kind, "extracting");
    match kind {
        ArchiveKind::Zip => extract_zip(archive_path, dest_dir),
        ArchiveKind::Tar => extract_tar(archive_path, dest_dir),
    }
}

/// Rejects absolute paths and `..` components.
fn ensure_relative(entry_path: &Path) -> Result<()> {
    if entry_path.is_absolute()
        || entry_path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
    {
        bail!(
            "Refusing to extract path with parent directory or absolute reference: {}",
            entry_path.display()
        );
    }
    Ok(())
}

/// Extracts a ZIP archive, restoring Unix permission bits when recorded.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or any entry fails to
/// extract.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", archive_path.display()))?;

    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read archive entry {i}"))?;

        let entry_path = entry
            .enclosed_name()
            .with_context(|| format!("Invalid entry path in archive: entry {i}"))?;
        ensure_relative(&entry_path)?;

        let output_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            std::fs::create_dir_all(&output_path).with_context(|| {
                format!("Failed to create directory: {}", output_path.display())
            })?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut outfile = std::fs::File::create(&output_path)
            .with_context(|| format!("Failed to create file: {}", output_path.display()))?;
        std::io::copy(&mut entry, &mut outfile)
            .with_context(|| format!("Failed to extract: {}", output_path.display()))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&output_path, std::fs::Permissions::from_mode(mode & 0o777))
                .with_context(|| format!("Failed to set permissions: {}", output_path.display()))?;
        }
    }

    Ok(())
}

/// Extracts a tarball. Compression is picked from the file name: `.xz`,
/// `.gz`/`.tgz`, or none.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or any entry fails to
/// extract.
pub fn extract_tar(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let name = archive_path.to_string_lossy();
    if name.ends_with(".xz") {
        unpack_tar(XzDecoder::new(file), archive_path, dest_dir)
    } else if name.ends_with(".gz") || name.ends_with(".tgz") {
        unpack_tar(GzDecoder::new(file), archive_path, dest_dir)
    } else {
        unpack_tar(file, archive_path, dest_dir)
    }
}

fn unpack_tar<R: Read>(reader: R, archive_path: &Path, dest_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    let mut archive = Archive::new(reader);

    for entry in archive
        .entries()
        .with_context(|| format!("Failed to read tar entries: {}", archive_path.display()))?
    {
        let mut entry = entry
            .with_context(|| format!("Failed to read tar entry: {}", archive_path.display()))?;

        let entry_path = entry
            .path()
            .with_context(|| "Failed to get entry path")?
            .into_owned();
        ensure_relative(&entry_path)?;

        let output_path = dest_dir.join(&entry_path);

        if entry.header().entry_type().is_dir() {
            std::fs::create_dir_all(&output_path).with_context(|| {
                format!("Failed to create directory: {}", output_path.display())
            })?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        entry
            .unpack(&output_path)
            .with_context(|| format!("Failed to extract: {}", output_path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_fs::TempDir;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tar::Builder;
    use xz2::write::XzEncoder;

    /// Appends the files of a fake Zig distribution under `root`.
    fn append_zig_tree<W: Write>(builder: &mut Builder<W>, root: &str) {
        let mut header = tar::Header::new_gnu();
        header.set_size(10);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{root}/zig"), b"zig binary".as_slice())
            .expect("Should append file");

        let mut header = tar::Header::new_gnu();
        header.set_size(12);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("{root}/lib/std/std.zig"),
                b"pub fn x(){}".as_slice(),
            )
            .expect("Should append file");
    }

    /// Builds an in-memory `.tar.xz` shaped like a Zig release.
    pub(crate) fn zig_tar_xz(root: &str) -> Vec<u8> {
        let encoder = XzEncoder::new(Vec::new(), 6);
        let mut builder = Builder::new(encoder);
        append_zig_tree(&mut builder, root);
        builder
            .into_inner()
            .expect("Should finish tar")
            .finish()
            .expect("Should finish xz")
    }

    fn write_zig_tar_gz(archive_path: &Path, root: &str) {
        let file = std::fs::File::create(archive_path).expect("Should create file");
        let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
        append_zig_tree(&mut builder, root);
        builder
            .into_inner()
            .expect("Should finish tar")
            .finish()
            .expect("Should finish gzip");
    }

    fn write_zig_zip(archive_path: &Path, root: &str) {
        let file = std::fs::File::create(archive_path).expect("Should create file");
        let mut zip = zip::ZipWriter::new(file);

        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        zip.start_file(format!("{root}/zig.exe"), options)
            .expect("Should start file");
        zip.write_all(b"zig binary").expect("Should write");

        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(format!("{root}/lib/std/std.zig"), options)
            .expect("Should start file");
        zip.write_all(b"pub fn x(){}").expect("Should write");

        zip.finish().expect("Should finish");
    }

    #[test]
    fn tar_xz_keeps_top_level_directory() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("zig-linux-x86_64-0.11.0.tar.xz");
        std::fs::write(&archive_path, zig_tar_xz("zig-linux-x86_64-0.11.0")).unwrap();
        let dest = temp.path().join("out");

        extract_archive(&archive_path, ArchiveKind::Tar, &dest).expect("Should extract");

        let root = dest.join("zig-linux-x86_64-0.11.0");
        assert_eq!(std::fs::read(root.join("zig")).unwrap(), b"zig binary");
        assert!(root.join("lib").join("std").join("std.zig").exists());
    }

    #[test]
    fn tar_gz_is_detected_by_name() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("zig.tar.gz");
        write_zig_tar_gz(&archive_path, "zig-linux-x86_64-0.7.0");
        let dest = temp.path().join("out");

        extract_archive(&archive_path, ArchiveKind::Tar, &dest).expect("Should extract");

        assert!(dest.join("zig-linux-x86_64-0.7.0").join("zig").exists());
    }

    #[test]
    fn zip_keeps_top_level_directory() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("zig-windows-x86_64-0.11.0.zip");
        write_zig_zip(&archive_path, "zig-windows-x86_64-0.11.0");
        let dest = temp.path().join("out");

        extract_archive(&archive_path, ArchiveKind::Zip, &dest).expect("Should extract");

        let root = dest.join("zig-windows-x86_64-0.11.0");
        assert!(root.join("zig.exe").exists());
        assert!(root.join("lib").join("std").join("std.zig").exists());
    }

    #[cfg(unix)]
    #[test]
    fn executable_bits_survive_extraction() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tar_path = temp.path().join("zig.tar.xz");
        std::fs::write(&tar_path, zig_tar_xz("root")).unwrap();
        let zip_path = temp.path().join("zig.zip");
        write_zig_zip(&zip_path, "root");

        extract_tar(&tar_path, &temp.path().join("tar")).unwrap();
        extract_zip(&zip_path, &temp.path().join("zip")).unwrap();

        let tar_mode = std::fs::metadata(temp.path().join("tar/root/zig"))
            .unwrap()
            .permissions()
            .mode();
        let zip_mode = std::fs::metadata(temp.path().join("zip/root/zig.exe"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(tar_mode & 0o111, 0o111);
        assert_eq!(zip_mode & 0o111, 0o111);
    }

    #[test]
    fn wrong_format_is_an_error() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("zig.zip");
        std::fs::write(&archive_path, zig_tar_xz("root")).unwrap();

        let result = extract_archive(&archive_path, ArchiveKind::Zip, &temp.path().join("out"));

        assert!(result.is_err());
    }

    #[test]
    fn corrupt_tar_xz_is_an_error() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("zig.tar.xz");
        std::fs::write(&archive_path, b"definitely not xz").unwrap();

        let result = extract_archive(&archive_path, ArchiveKind::Tar, &temp.path().join("out"));

        assert!(result.is_err());
    }

    #[test]
    fn parent_directory_entries_are_rejected() {
        assert!(ensure_relative(Path::new("zig/../../etc/passwd")).is_err());
        assert!(ensure_relative(Path::new("/etc/passwd")).is_err());
        assert!(ensure_relative(Path::new("zig-linux-x86_64-0.11.0/zig")).is_ok());
    }
}
