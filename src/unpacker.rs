use crate::error::{MirrorError, Result};
use crate::types::ArchiveUnit;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

pub const DIR_MODE: u32 = 0o755;
pub const FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackStats {
    pub files: usize,
    pub bytes: u64,
}

/// Unpacks on the blocking pool so the runtime is not stalled by zip I/O.
pub async fn unpack(archive_path: PathBuf, mirror_root: PathBuf, unit: ArchiveUnit) -> Result<UnpackStats> {
    tokio::task::spawn_blocking(move || unpack_archive(&archive_path, &mirror_root, &unit))
        .await
        .map_err(|e| MirrorError::Extraction(format!("unpack task failed: {e}")))?
}

/// Creates the unit's partition and every missing parent, each with `DIR_MODE`.
pub fn create_partition(mirror_root: &Path, unit: &ArchiveUnit) -> Result<PathBuf> {
    let partition = unit.partition(mirror_root);
    let missing: Vec<PathBuf> = partition
        .ancestors()
        .take_while(|dir| !dir.exists())
        .map(Path::to_path_buf)
        .collect();

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
        .create(&partition)
        .map_err(|e| extraction_error(&partition, e))?;

    // umask may have masked the builder's mode
    for dir in &missing {
        set_mode(dir, DIR_MODE)?;
    }
    Ok(partition)
}

/// Extracts every file entry by basename into the unit's partition, then
/// removes the archive. Internal archive directories are dropped.
pub fn unpack_archive(archive_path: &Path, mirror_root: &Path, unit: &ArchiveUnit) -> Result<UnpackStats> {
    let partition = create_partition(mirror_root, unit)?;
    info!("unzipping {} to {} ...", archive_path.display(), partition.display());

    let file = File::open(archive_path).map_err(|e| extraction_error(archive_path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut stats = UnpackStats::default();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().replace('\\', "/");
        let Some(basename) = Path::new(&name).file_name() else {
            debug!("skipping archive entry {:?}", name);
            continue;
        };

        let out_path = partition.join(basename);
        let mut out = File::create(&out_path).map_err(|e| extraction_error(&out_path, e))?;
        stats.bytes += io::copy(&mut entry, &mut out).map_err(|e| extraction_error(&out_path, e))?;
        set_mode(&out_path, FILE_MODE)?;
        stats.files += 1;
    }

    fs::remove_file(archive_path).map_err(|e| extraction_error(archive_path, e))?;
    info!("{}: {} files, {} bytes", unit, stats.files, stats.bytes);
    Ok(stats)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| extraction_error(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

fn extraction_error(path: &Path, e: io::Error) -> MirrorError {
    MirrorError::Extraction(format!("{}: {}", path.display(), e))
}
