use std::path::PathBuf;

use clap::Parser;
use mbdsync_core::config::DEFAULT_DAYS;

#[derive(Parser, Debug)]
#[command(
    name = "mbdsync",
    version,
    about = "Download new daycare photo and video memories",
    after_help = "Credentials are read from BH_USERNAME and BH_PASSWORD (a .env file works too)."
)]
pub struct Cli {
    /// Number of trailing days to scan, counting back from today
    #[arg(short = 'd', long, default_value_t = DEFAULT_DAYS)]
    pub days: u32,

    /// Directory downloaded memories are written to [default: downloads]
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Directory for the cached access token [default: platform cache dir]
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Remember downloaded attachment ids between runs, not only files on disk
    #[arg(long)]
    pub remember_downloads: bool,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["mbdsync"]);
        assert_eq!(cli.days, 7);
        assert!(cli.download_dir.is_none());
        assert!(!cli.remember_downloads);
    }

    #[test]
    fn test_days_flag() {
        let cli = Cli::parse_from(["mbdsync", "--days", "30", "--remember-downloads"]);
        assert_eq!(cli.days, 30);
        assert!(cli.remember_downloads);

        let cli = Cli::parse_from(["mbdsync", "-d", "1"]);
        assert_eq!(cli.days, 1);
    }

    #[test]
    fn test_days_must_be_a_number() {
        assert!(Cli::try_parse_from(["mbdsync", "--days", "week"]).is_err());
    }
}
