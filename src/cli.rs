use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mirror PhenoCam image archives for a list of sites", long_about = None)]
pub struct Cli {
    /// Config file listing the sites (and optional years, months, times) to mirror
    #[arg(short, long)]
    pub config: PathBuf,

    /// Increase output verbosity
    #[arg(short, long)]
    pub verbose: bool,

    /// Log connections and dump unparseable responses for debugging
    #[arg(short, long)]
    pub debug: bool,

    /// Root directory of the local mirror
    #[arg(long, env = "PHENOCAM_MIRROR_DIR")]
    pub mirror_dir: PathBuf,

    /// PhenoCam account name
    #[arg(long, env = "PHENOCAM_USER")]
    pub username: String,

    /// PhenoCam account password
    #[arg(long, env = "PHENOCAM_PASSWD", hide_env_values = true)]
    pub password: String,

    /// Directory for archives while they are downloaded
    #[arg(long, default_value = "/var/tmp")]
    pub tmp_dir: PathBuf,
}
