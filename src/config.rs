use crate::cli::Cli;
use crate::error::{MirrorError, Result};
use std::path::PathBuf;

pub const PHENOCAM_URL: &str = "https://phenocam.sr.unh.edu";

/// Run context handed to every component; nothing is read from globals.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub mirror_root: PathBuf,
    pub tmp_dir: PathBuf,
    pub username: String,
    pub password: String,
    pub verbose: bool,
    pub debug: bool,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if !cli.mirror_dir.is_dir() {
            return Err(MirrorError::Config(format!(
                "Mirror directory {} does not exist",
                cli.mirror_dir.display()
            )));
        }
        if cli.username.is_empty() || cli.password.is_empty() {
            return Err(MirrorError::Config(
                "Set username and password in PHENOCAM_USER and PHENOCAM_PASSWD".to_string(),
            ));
        }

        Ok(Self {
            base_url: PHENOCAM_URL.to_string(),
            mirror_root: cli.mirror_dir.clone(),
            tmp_dir: cli.tmp_dir.clone(),
            username: cli.username.clone(),
            password: cli.password.clone(),
            verbose: cli.verbose,
            debug: cli.debug,
        })
    }

    pub fn login_url(&self) -> String {
        format!("{}/webcam/accounts/login/", self.base_url)
    }

    pub fn request_url(&self) -> String {
        format!("{}/webcam/network/download/", self.base_url)
    }

    pub fn site_url(&self, site_id: &str) -> String {
        format!("{}/webcam/archive/sites/{}/?format=json", self.base_url, site_id)
    }
}
