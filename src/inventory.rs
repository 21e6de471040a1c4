use crate::types::ArchiveUnit;
use log::debug;
use std::path::Path;

/// Number of `<prefix>*.jpg` images already in the unit's partition.
pub fn count_mirrored_files(mirror_root: &Path, unit: &ArchiveUnit) -> usize {
    let partition = unit.partition(mirror_root);
    let prefix = unit.file_prefix();

    let Ok(entries) = std::fs::read_dir(&partition) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with(&prefix) && name.ends_with(".jpg"))
                .unwrap_or(false)
        })
        .count()
}

/// True when at least one image of the unit is present.
///
/// Presence only: a partition left behind by an interrupted unpack counts as
/// mirrored, since the number of images the service would send is unknown.
pub fn is_already_mirrored(mirror_root: &Path, unit: &ArchiveUnit) -> bool {
    let count = count_mirrored_files(mirror_root, unit);
    debug!("{}: {} images in {}", unit, count, unit.partition(mirror_root).display());
    count > 0
}
