use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "folder-sort")]
#[command(about = "Sort a directory into category folders", long_about = None)]
pub struct Cli {
    /// Directory to organize
    pub root: PathBuf,

    /// Number of items sent to the classifier per request
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Classify by file extension instead of calling the remote model
    #[arg(long)]
    pub offline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_root_and_batch_size() {
        let cli = Cli::parse_from(["folder-sort", "/tmp/inbox", "--batch-size", "20"]);
        assert_eq!(cli.root, PathBuf::from("/tmp/inbox"));
        assert_eq!(cli.batch_size, Some(20));
        assert!(!cli.offline);
    }

    #[test]
    fn test_root_is_required() {
        assert!(Cli::try_parse_from(["folder-sort"]).is_err());
    }
}
