//! Command-line arguments. Flags given here win over `config.toml`.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "vbridge")]
#[command(about = "Terminal front-end for an interactive binary-diffing verifier")]
#[command(version)]
pub struct Cli {
    /// A `*.run-config.json` to start the verifier, or a `*.replay` trace to replay
    pub run: PathBuf,

    /// Include counter-example traces in graph nodes
    #[arg(long)]
    pub show_ce_trace: bool,

    /// Verifier executable (default from config, then `pate`)
    #[arg(long, value_name = "PROGRAM")]
    pub verifier: Option<String>,

    /// Color theme: dark | catppuccin-mocha
    #[arg(long)]
    pub theme: Option<String>,

    /// Where to record the trace of a live run (default: lastrun.replay beside the run file)
    #[arg(long, value_name = "PATH")]
    pub trace: Option<PathBuf>,
}

impl Cli {
    /// Folds the command-line overrides into the loaded config.
    pub fn apply(&self, mut config: Config) -> Config {
        if self.show_ce_trace {
            config.show_ce_trace = true;
        }
        if let Some(verifier) = &self.verifier {
            config.verifier.clone_from(verifier);
        }
        if let Some(theme) = &self.theme {
            config.theme.clone_from(theme);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "vbridge",
            "t1.run-config.json",
            "--show-ce-trace",
            "--verifier",
            "/opt/pate",
        ]);
        let config = cli.apply(Config::default());

        assert!(config.show_ce_trace);
        assert_eq!(config.verifier, "/opt/pate");
        assert_eq!(config.theme, Config::default().theme);
        assert_eq!(cli.trace, None);
    }
}
