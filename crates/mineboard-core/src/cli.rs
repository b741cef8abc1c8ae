use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use mineboard_shared::TaskId;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "board",
    version,
    about = "Mineboard: the server's shared task board",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "boardrc")]
    pub boardrc: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show pending and completed tasks.
    List {
        /// Only tasks in this category (name or id).
        #[arg(long, short = 'c')]
        category: Option<String>,
    },
    /// Create a task authored by the current nickname.
    Add {
        title: String,
        /// Category name or id; repeatable.
        #[arg(long = "category", short = 'c')]
        categories: Vec<String>,
    },
    /// Flip a task between pending and completed.
    Done { id: TaskId },
    /// Join or leave a task as a player.
    Join { id: TaskId },
    /// Show or set the nickname.
    Nick { name: Option<String> },
    /// List the categories.
    Categories,
    /// Re-fetch and show the board.
    Refresh,
}

impl Default for Command {
    fn default() -> Self {
        Command::List { category: None }
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls bare `rc.key=value` / `rc.key:value` words out of the argument
/// list so they can appear anywhere, as with `--rc`.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = rest
                .split_once('=')
                .or_else(|| rest.split_once(':'))
                .map(|(k, v)| (format!("rc.{k}"), v.to_string()));

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn positional_rc_overrides_are_extracted() {
        let pre = preprocess_args(&args(&["board", "rc.color=off", "list", "rc.identity.key:NICK"]))
            .expect("preprocess");
        assert_eq!(pre.cleaned_args, args(&["board", "list"]));
        assert_eq!(
            pre.rc_overrides,
            vec![
                ("rc.color".to_string(), "off".to_string()),
                ("rc.identity.key".to_string(), "NICK".to_string()),
            ]
        );
    }

    #[test]
    fn parses_add_with_categories() {
        let cli = GlobalCli::parse_from([
            "board",
            "--data",
            "/tmp/board",
            "add",
            "Build wall",
            "-c",
            "Construção",
            "--category",
            "2",
        ]);
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/board")));
        assert_eq!(
            cli.command,
            Some(Command::Add {
                title: "Build wall".to_string(),
                categories: vec!["Construção".to_string(), "2".to_string()],
            })
        );
    }

    #[test]
    fn missing_command_defaults_to_list() {
        let cli = GlobalCli::parse_from(["board", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command.unwrap_or_default(), Command::List { category: None });
    }

    #[test]
    fn key_val_requires_equals() {
        assert!("color".parse::<KeyVal>().is_err());
        let kv: KeyVal = " color = off ".parse().expect("parse");
        assert_eq!((kv.key.as_str(), kv.value.as_str()), ("color", "off"));
    }
}
