use crate::error::{MirrorError, Result};
use crate::session::PhenocamClient;
use crate::types::AvailabilityIndex;
use log::{debug, info, warn};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SiteArchive {
    monthly_file_counts: Vec<MonthlyFileCount>,
}

/// Only presence matters; the count itself is ignored.
#[derive(Debug, Deserialize)]
struct MonthlyFileCount {
    year: i32,
    month: u32,
}

pub fn parse_availability(body: &str) -> Result<AvailabilityIndex> {
    let archive: SiteArchive = serde_json::from_str(body)?;
    Ok(archive
        .monthly_file_counts
        .into_iter()
        .map(|entry| (entry.year, entry.month))
        .collect())
}

impl PhenocamClient {
    /// Which (year, month) pairs have any images for `site_id`. Unauthenticated.
    pub async fn discover_availability(&self, site_id: &str) -> Result<AvailabilityIndex> {
        let url = self.settings.site_url(site_id);
        info!("GET request to {}", url);
        let response = self.public_client.get(&url).send().await?;
        debug!("status: {}", response.status());
        if !response.status().is_success() {
            return Err(MirrorError::status(&url, response.status()));
        }

        let index = parse_availability(&response.text().await?)?;
        if index.is_empty() {
            warn!("{}: no images available remotely", site_id);
        }
        info!("{}: {} months with data", site_id, index.len());
        Ok(index)
    }
}
