use crate::error::Result;
use crate::session::PhenocamClient;
use crate::types::{ArchiveUnit, AvailabilityIndex};
use crate::unpacker::{self, UnpackStats};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Everything the mirror driver needs from the outside world for one unit.
#[async_trait]
pub trait ArchiveService: Send + Sync {
    async fn login(&self) -> Result<()>;

    async fn discover_availability(&self, site_id: &str) -> Result<AvailabilityIndex>;

    async fn request_archive(
        &self,
        unit: &ArchiveUnit,
        start_time: &str,
        end_time: &str,
    ) -> Result<Option<String>>;

    async fn fetch_archive(&self, url: &str, unit: &ArchiveUnit) -> Result<PathBuf>;

    async fn unpack_archive(
        &self,
        archive_path: &Path,
        mirror_root: &Path,
        unit: &ArchiveUnit,
    ) -> Result<UnpackStats> {
        unpacker::unpack(archive_path.to_path_buf(), mirror_root.to_path_buf(), unit.clone()).await
    }
}

#[async_trait]
impl ArchiveService for PhenocamClient {
    async fn login(&self) -> Result<()> {
        PhenocamClient::login(self).await
    }

    async fn discover_availability(&self, site_id: &str) -> Result<AvailabilityIndex> {
        PhenocamClient::discover_availability(self, site_id).await
    }

    async fn request_archive(
        &self,
        unit: &ArchiveUnit,
        start_time: &str,
        end_time: &str,
    ) -> Result<Option<String>> {
        PhenocamClient::request_archive(self, unit, start_time, end_time).await
    }

    async fn fetch_archive(&self, url: &str, unit: &ArchiveUnit) -> Result<PathBuf> {
        PhenocamClient::fetch_archive(self, url, unit).await
    }
}
