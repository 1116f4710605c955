//! Run selection: turning the path on the command line into a session source.
//!
//! Two kinds of file are accepted, told apart by suffix:
//!
//! - `*.run-config.json` starts a live verifier. Its trace is written to
//!   `lastrun.replay` in the same directory unless overridden.
//! - `*.replay` re-drives a recorded trace with no operator involved.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use vbridge_core::session::{SessionSource, VerifierCommand};

pub const RUN_CONFIG_SUFFIX: &str = ".run-config.json";
pub const REPLAY_SUFFIX: &str = ".replay";
/// File name of the trace recorded beside a run configuration.
pub const TRACE_FILE_NAME: &str = "lastrun.replay";

#[derive(Debug, thiserror::Error)]
pub enum RunSelectionError {
    #[error("{0}: expected a `{RUN_CONFIG_SUFFIX}` or `{REPLAY_SUFFIX}` file")]
    UnknownKind(PathBuf),
    #[error("cannot read run configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid run configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What the operator asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSelection {
    Live { config: PathBuf, trace: PathBuf },
    Replay { transcript: PathBuf },
}

impl RunSelection {
    /// Classifies `path` by suffix.
    pub fn from_path(path: &Path) -> Result<Self, RunSelectionError> {
        let name = path.to_string_lossy();
        if name.ends_with(RUN_CONFIG_SUFFIX) {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            Ok(Self::Live { config: path.to_owned(), trace: dir.join(TRACE_FILE_NAME) })
        } else if name.ends_with(REPLAY_SUFFIX) {
            Ok(Self::Replay { transcript: path.to_owned() })
        } else {
            Err(RunSelectionError::UnknownKind(path.to_owned()))
        }
    }

    /// Replaces the trace location of a live run.
    pub fn with_trace(self, trace: Option<PathBuf>) -> Self {
        match (self, trace) {
            (Self::Live { config, .. }, Some(trace)) => Self::Live { config, trace },
            (other, _) => other,
        }
    }

    /// Short label shown in the panel titles, e.g. `vbridge demo.replay`.
    pub fn title(&self) -> String {
        let path = match self {
            Self::Live { config, .. } => config,
            Self::Replay { transcript } => transcript,
        };
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        format!("vbridge {name}")
    }

    /// Resolves the selection into something the session thread can run.
    ///
    /// `default_verifier` is used when the run configuration does not name one.
    pub fn into_source(self, default_verifier: &str) -> Result<SessionSource, RunSelectionError> {
        match self {
            Self::Replay { transcript } => Ok(SessionSource::Replay { transcript }),
            Self::Live { config, trace } => {
                let run = RunConfig::load(&config)?;
                let base = config.parent().unwrap_or_else(|| Path::new(""));
                Ok(SessionSource::Live {
                    command: run.command(base, default_verifier),
                    trace: Some(trace),
                })
            }
        }
    }
}

/// Contents of a `*.run-config.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    pub original: PathBuf,
    pub patched: PathBuf,
    /// Extra verifier arguments, passed through verbatim.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub verifier: Option<String>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, RunSelectionError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| RunSelectionError::Read { path: path.to_owned(), source })?;
        serde_json::from_str(&raw)
            .map_err(|source| RunSelectionError::Parse { path: path.to_owned(), source })
    }

    /// Builds `<verifier> -o <original> -p <patched> --json-toplevel <args..>`.
    ///
    /// Relative binary paths resolve against `base`, which also becomes the
    /// verifier's working directory.
    pub fn command(&self, base: &Path, default_verifier: &str) -> VerifierCommand {
        let program = self.verifier.as_deref().unwrap_or(default_verifier);
        let mut command = VerifierCommand::new(program)
            .arg("-o")
            .arg(base.join(&self.original).to_string_lossy())
            .arg("-p")
            .arg(base.join(&self.patched).to_string_lossy())
            .arg("--json-toplevel");
        command.args.extend(self.args.iter().cloned());
        if !base.as_os_str().is_empty() {
            command.cwd = Some(base.to_owned());
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_selects_the_kind_of_run() {
        let live = RunSelection::from_path(Path::new("/work/t1.run-config.json")).unwrap();
        assert_eq!(
            live,
            RunSelection::Live {
                config: PathBuf::from("/work/t1.run-config.json"),
                trace: PathBuf::from("/work/lastrun.replay"),
            }
        );

        let replay = RunSelection::from_path(Path::new("/work/lastrun.replay")).unwrap();
        assert!(matches!(replay, RunSelection::Replay { .. }));
        assert_eq!(replay.title(), "vbridge lastrun.replay");

        let err = RunSelection::from_path(Path::new("/work/t1.json")).unwrap_err();
        assert!(matches!(err, RunSelectionError::UnknownKind(_)));
    }

    #[test]
    fn trace_override_applies_to_live_runs_only() {
        let custom = Some(PathBuf::from("/tmp/custom.replay"));
        let live = RunSelection::from_path(Path::new("a.run-config.json"))
            .unwrap()
            .with_trace(custom.clone());
        assert!(matches!(live, RunSelection::Live { trace, .. } if trace == PathBuf::from("/tmp/custom.replay")));

        let replay = RunSelection::from_path(Path::new("b.replay")).unwrap().with_trace(custom);
        assert_eq!(replay, RunSelection::Replay { transcript: PathBuf::from("b.replay") });
    }

    #[test]
    fn run_config_builds_the_verifier_command_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("t1.run-config.json");
        std::fs::write(
            &path,
            r#"{"original":"orig.exe","patched":"/abs/patched.exe","args":["-s","main"]}"#,
        )
        .unwrap();

        let source = RunSelection::from_path(&path).unwrap().into_source("pate").unwrap();

        let SessionSource::Live { command, trace } = source else { panic!("expected a live run") };
        assert_eq!(command.program, "pate");
        let orig = dir.path().join("orig.exe").to_string_lossy().into_owned();
        assert_eq!(
            command.args,
            ["-o", orig.as_str(), "-p", "/abs/patched.exe", "--json-toplevel", "-s", "main"]
        );
        assert_eq!(command.cwd.as_deref(), Some(dir.path()));
        assert_eq!(trace, Some(dir.path().join(TRACE_FILE_NAME)));
    }

    #[test]
    fn run_config_may_name_its_verifier() {
        let run: RunConfig =
            serde_json::from_str(r#"{"original":"a","patched":"b","verifier":"/opt/pate"}"#).unwrap();
        assert_eq!(run.command(Path::new(""), "pate").program, "/opt/pate");
        assert_eq!(run.command(Path::new(""), "pate").cwd, None);
    }

    #[test]
    fn malformed_run_config_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.run-config.json");
        std::fs::write(&path, "{\"original\": 1}").unwrap();

        let err = RunSelection::from_path(&path).unwrap().into_source("pate").unwrap_err();
        assert!(matches!(err, RunSelectionError::Parse { .. }), "{err}");
    }
}
