use crate::error::{MirrorError, Result};
use crate::session::PhenocamClient;
use crate::types::ArchiveUnit;
use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;

impl PhenocamClient {
    /// Streams the archive behind `url` into the temp directory.
    ///
    /// The body goes to `<name>.zip.part` and is renamed to `<name>.zip` only
    /// after the last byte is synced. A failed transfer leaves the `.part` file.
    pub async fn fetch_archive(&self, url: &str, unit: &ArchiveUnit) -> Result<PathBuf> {
        let zip_path = self.settings.tmp_dir.join(unit.archive_name());
        let part_path = part_path_for(&zip_path);

        info!("GET request to redirect_url {}", url);
        let response = self
            .raw_client
            .get(url)
            .send()
            .await
            .map_err(|e| transfer_error(&part_path, e))?;
        let status = response.status();
        // Redirects are not followed; anything short of an error status is the payload.
        if status.is_client_error() || status.is_server_error() {
            return Err(transfer_error(&part_path, format!("got status {status}")));
        }

        let pb = self.create_progress_bar(unit, response.content_length());
        let stream = response
            .bytes_stream()
            .inspect_ok(|chunk| pb.inc(chunk.len() as u64))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let reader = StreamReader::new(stream);
        tokio::pin!(reader);

        let file = File::create(&part_path).await.map_err(|e| transfer_error(&part_path, e))?;
        let mut writer = BufWriter::new(file);
        let bytes = tokio::io::copy(&mut reader, &mut writer)
            .await
            .map_err(|e| transfer_error(&part_path, e))?;
        writer.flush().await.map_err(|e| transfer_error(&part_path, e))?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|e| transfer_error(&part_path, e))?;
        pb.finish_and_clear();

        tokio::fs::rename(&part_path, &zip_path)
            .await
            .map_err(|e| transfer_error(&part_path, e))?;
        info!("downloaded {} ({} bytes)", zip_path.display(), bytes);

        Ok(zip_path)
    }

    fn create_progress_bar(&self, unit: &ArchiveUnit, length: Option<u64>) -> ProgressBar {
        if !self.settings.verbose {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(length.unwrap_or(0));
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(unit.archive_name());
        pb
    }
}

fn transfer_error(part_path: &Path, e: impl std::fmt::Display) -> MirrorError {
    MirrorError::Transfer(format!("{}: {}", part_path.display(), e))
}

pub fn part_path_for(zip_path: &Path) -> PathBuf {
    let mut name = zip_path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
