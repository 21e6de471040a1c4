use crate::error::{MirrorError, Result};
use crate::inventory;
use crate::remote::ArchiveService;
use crate::types::{days_in_month, ArchiveUnit, DownloadSpec, MirrorSummary, UnitOutcome};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Walks every requested (site, year, month, day) and mirrors what is missing.
///
/// Per unit: pruned when the month has no data remotely, skipped when the
/// partition already holds images, otherwise requested, fetched and unpacked.
/// Login happens once, right before the first request. Any error ends the
/// run; a rerun resumes because mirrored units are skipped.
pub struct Mirror<S: ArchiveService> {
    service: S,
    mirror_root: PathBuf,
    logged_in: bool,
}

impl<S: ArchiveService> Mirror<S> {
    pub fn new(service: S, mirror_root: PathBuf) -> Self {
        Self {
            service,
            mirror_root,
            logged_in: false,
        }
    }

    #[cfg(test)]
    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn run(&mut self, specs: &[DownloadSpec]) -> Result<MirrorSummary> {
        let start_time = Instant::now();
        let mut summary = MirrorSummary::default();

        for spec in specs {
            self.mirror_site(spec, &mut summary).await?;
        }

        summary.total_duration = start_time.elapsed();
        Ok(summary)
    }

    async fn mirror_site(&mut self, spec: &DownloadSpec, summary: &mut MirrorSummary) -> Result<()> {
        let availability = self.service.discover_availability(&spec.site_id).await?;

        for &year in &spec.years {
            for &month in &spec.months {
                if !availability.contains(year, month) {
                    debug!("{} {}/{:02}: no data available, not requesting", spec.site_id, year, month);
                    summary.record(ArchiveUnit::monthly(&spec.site_id, year, month), UnitOutcome::Pruned);
                    continue;
                }

                let last_day = days_in_month(year, month)
                    .ok_or_else(|| MirrorError::Config(format!("invalid month {year}-{month}")))?;
                for day in 1..=last_day {
                    let unit = ArchiveUnit::daily(&spec.site_id, year, month, day);
                    let outcome = self.mirror_unit(&unit, spec).await?;
                    summary.record(unit, outcome);
                }
            }
        }
        Ok(())
    }

    async fn mirror_unit(&mut self, unit: &ArchiveUnit, spec: &DownloadSpec) -> Result<UnitOutcome> {
        if inventory::is_already_mirrored(&self.mirror_root, unit) {
            info!(
                "skipping download, files found in {}",
                unit.partition(&self.mirror_root).display()
            );
            return Ok(UnitOutcome::Skipped);
        }

        info!("download {}", unit);
        self.ensure_logged_in().await?;

        let Some(url) = self
            .service
            .request_archive(unit, &spec.start_time, &spec.end_time)
            .await?
        else {
            warn!("{}: extracting redirect url failed, nothing to download", unit);
            return Ok(UnitOutcome::MissingRemote);
        };

        let archive = self.service.fetch_archive(&url, unit).await?;
        let stats = self
            .service
            .unpack_archive(&archive, &self.mirror_root, unit)
            .await?;

        Ok(UnitOutcome::Unpacked {
            files: stats.files,
            bytes: stats.bytes,
        })
    }

    async fn ensure_logged_in(&mut self) -> Result<()> {
        if !self.logged_in {
            self.service.login().await?;
            self.logged_in = true;
        }
        Ok(())
    }
}
