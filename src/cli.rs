use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "macsetup")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Install everything declared in desired.json that this Mac is missing",
    long_about = "Reads desired.json (or desired.toml) from the config directory, probes \
                  Homebrew, the App Store, /Applications and the global git identity, and \
                  installs whatever is missing. Nothing is ever removed.\n\n\
                  Set RUST_LOG=info or RUST_LOG=debug for more detail."
)]
pub struct Cli {
    /// Show what would be installed without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dry_run_flag() {
        assert!(!Cli::parse_from(["macsetup"]).dry_run);
        assert!(Cli::parse_from(["macsetup", "--dry-run"]).dry_run);
        assert!(Cli::try_parse_from(["macsetup", "--force"]).is_err());
    }
}
