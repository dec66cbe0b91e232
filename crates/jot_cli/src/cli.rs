//! CLI definition and command dispatch for jot.
//!
//! Configuration is resolved with the following precedence (highest to
//! lowest):
//! 1. CLI flags (`--home`, `--backend`, `--editor`, `--log-level`)
//! 2. Environment variables (`JOTHOME`, `JOT_BACKEND`, `JOT_EDITOR`, `JOT_LOG`,
//!    then `VISUAL`/`EDITOR` for the editor)
//! 3. Built-in defaults (`~/.jot`, sqlite, `editor`)

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use jot_core::{
    init_logging, open_store, purge_storage, shutdown_logging, ConfigOverrides, EditOutcome,
    ExternalEditor, JotConfig, JotError, JotService, StorageBackend,
};

const LIST_TIME_FORMAT: &str = "%m-%d-%Y %H:%M:%S";

/// Directory-scoped notes: jots belong to the nearest tracked directory
#[derive(Parser, Debug)]
#[command(name = "jot", version, about, long_about = None)]
pub struct Cli {
    /// Storage root (default: ~/.jot)
    #[arg(long, global = true, env = "JOTHOME")]
    pub home: Option<PathBuf>,

    /// Storage backend: sqlite or fs
    #[arg(long, global = true, env = "JOT_BACKEND")]
    pub backend: Option<StorageBackend>,

    /// Editor command line, e.g. "code --wait"
    #[arg(long, global = true, env = "JOT_EDITOR")]
    pub editor: Option<String>,

    /// Log level: trace, debug, info, warn, error or off
    #[arg(long, global = true, env = "JOT_LOG")]
    pub log_level: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Edit a jot (use when the title collides with a command name)
    Edit { title: String },

    /// `jot <title>`: edit a jot in the current directory's namespace
    #[command(external_subcommand)]
    Title(Vec<String>),

    /// Track the current directory
    #[command(visible_alias = "t")]
    Track,

    /// Untrack the current directory and delete its jots
    #[command(visible_alias = "u")]
    Untrack,

    /// List jots visible from the current directory
    #[command(visible_alias = "l")]
    List,

    /// Print a jot's content
    #[command(visible_alias = "o")]
    Show { title: String },

    /// Delete a jot
    #[command(visible_alias = "d")]
    Delete { title: String },

    /// List every tracked directory
    Tracked,

    /// Copy a jot into the namespace of another directory
    Copy {
        title: String,
        /// Directory whose namespace receives the copy
        dest: PathBuf,
        /// Title for the copy (defaults to the source title)
        #[arg(long = "as")]
        new_title: Option<String>,
    },

    /// Delete all jots and tracked directories on this system
    CleanAll,
}

#[derive(Debug)]
enum CliError {
    Config(String),
    Usage(String),
    Io { context: &'static str, source: io::Error },
    Jot(JotError),
    /// Failure of one command, naming what was attempted.
    Failed { operation: String, source: Box<CliError> },
}

impl CliError {
    fn during(self, operation: String) -> Self {
        match self {
            Self::Config(_) | Self::Usage(_) | Self::Failed { .. } => self,
            other => Self::Failed {
                operation,
                source: Box::new(other),
            },
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) => write!(f, "invalid configuration: {message}"),
            Self::Usage(message) => write!(f, "{message}"),
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::Jot(err) => write!(f, "{err}"),
            Self::Failed { operation, source } => write!(f, "couldn't {operation}: {source}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(_) | Self::Usage(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Jot(err) => Some(err),
            Self::Failed { source, .. } => Some(source.as_ref()),
        }
    }
}

impl From<JotError> for CliError {
    fn from(value: JotError) -> Self {
        Self::Jot(value)
    }
}

type CliResult<T> = Result<T, CliError>;

/// Parses arguments, runs one command and maps the result to an exit code.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let code = match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("jot: {err}");
            ExitCode::FAILURE
        }
    };
    shutdown_logging();
    code
}

fn execute(cli: Cli) -> CliResult<()> {
    let cwd = current_dir()?;
    let config = resolve_config(&cli, &cwd)?;

    if let Err(err) = init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("jot: logging disabled: {err}");
    }

    let Cli { yes, command, .. } = cli;
    let command = match command {
        Some(Command::Title(args)) => Command::Edit {
            title: single_title(args)?,
        },
        Some(command) => command,
        None => {
            return Err(CliError::Usage(
                "expected a jot title or a command; see `jot --help`".to_string(),
            ))
        }
    };
    info!("event=cli_command module=cli status=start command={}", command.name());

    let operation = command.describe();
    dispatch(command, &config, &cwd, yes).map_err(|err| err.during(operation))
}

fn dispatch(command: Command, config: &JotConfig, cwd: &Path, yes: bool) -> CliResult<()> {
    if let Command::CleanAll = command {
        return clean_all(config, yes);
    }

    let service = JotService::from_boxed(open_store(config)?);
    match command {
        Command::Edit { title } => edit(&service, config, cwd, &title),
        Command::Track => {
            service.track_path(cwd)?;
            println!("Tracking {}", cwd.display());
            Ok(())
        }
        Command::Untrack => {
            let prompt = format!("Untrack {} and delete its jots?", cwd.display());
            if !confirm(&prompt, yes)? {
                return Ok(());
            }
            service.untrack_path(cwd)?;
            println!("Untracked {}", cwd.display());
            Ok(())
        }
        Command::List => {
            let namespace = service.resolve_namespace(cwd)?;
            let entries = service.list_entries(namespace.id)?;
            if entries.is_empty() {
                println!("No jots in this dir");
            }
            for entry in entries {
                println!("{}\t{}", format_timestamp(entry.last_modified()), entry.title);
            }
            Ok(())
        }
        Command::Show { title } => {
            let namespace = service.resolve_namespace(cwd)?;
            let entry = service.show(namespace.id, &title)?;
            print!("{}", entry.content);
            io::stdout().flush().map_err(|source| CliError::Io {
                context: "couldn't write to stdout",
                source,
            })
        }
        Command::Delete { title } => {
            let namespace = service.resolve_namespace(cwd)?;
            if !confirm(&format!("Delete jot `{title}`?"), yes)? {
                return Ok(());
            }
            service.delete_entry(namespace.id, &title)?;
            println!("Deleted {title}");
            Ok(())
        }
        Command::Tracked => {
            let tracked = service.list_tracked_paths()?;
            if tracked.is_empty() {
                println!("No jots on this system");
            }
            for path in tracked {
                println!("{}", path.display());
            }
            Ok(())
        }
        Command::Copy {
            title,
            dest,
            new_title,
        } => {
            let namespace = service.resolve_namespace(cwd)?;
            let destination = cwd.join(dest).canonicalize().map_err(|source| CliError::Io {
                context: "couldn't resolve the destination directory",
                source,
            })?;
            service.copy_entry(namespace.id, &title, &destination, new_title.as_deref())?;
            println!("Copied {title} to {}", destination.display());
            Ok(())
        }
        Command::Title(args) => edit(&service, config, cwd, &single_title(args)?),
        Command::CleanAll => clean_all(config, yes),
    }
}

/// Accepts `jot <title>` and rejects trailing words.
fn single_title(args: Vec<String>) -> CliResult<String> {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(title), None) => Ok(title),
        (_, Some(extra)) => Err(CliError::Usage(format!(
            "unexpected argument `{extra}` after the jot title; quote titles containing spaces"
        ))),
        (None, None) => Err(CliError::Usage("missing jot title".to_string())),
    }
}

fn edit(service: &JotService, config: &JotConfig, cwd: &Path, title: &str) -> CliResult<()> {
    let namespace = service.resolve_namespace(cwd)?;
    let mut editor = ExternalEditor::from_command_line(&config.editor).map_err(|source| {
        CliError::Jot(JotError::EditorFailed {
            title: title.to_string(),
            source,
        })
    })?;
    match service.edit(namespace.id, title, &mut editor)? {
        EditOutcome::Created => info!("event=cli_edit module=cli status=ok outcome=created"),
        EditOutcome::Updated => info!("event=cli_edit module=cli status=ok outcome=updated"),
    }
    Ok(())
}

fn clean_all(config: &JotConfig, yes: bool) -> CliResult<()> {
    if !confirm("Delete all jots on this system?", yes)? {
        return Ok(());
    }
    if purge_storage(config)? {
        println!("Removed all jots");
    } else {
        println!("No jots on this system");
    }
    Ok(())
}

fn resolve_config(cli: &Cli, cwd: &Path) -> CliResult<JotConfig> {
    let overrides = ConfigOverrides {
        home: cli.home.clone(),
        backend: cli.backend,
        editor: cli.editor.clone(),
        log_level: cli.log_level.clone(),
    };
    let mut config = JotConfig::resolve(overrides).map_err(CliError::Config)?;
    if config.home.is_relative() {
        config.home = cwd.join(&config.home);
    }
    Ok(config)
}

fn current_dir() -> CliResult<PathBuf> {
    std::env::current_dir()
        .and_then(|dir| dir.canonicalize())
        .map_err(|source| CliError::Io {
            context: "couldn't determine the working directory",
            source,
        })
}

/// Asks a `[N/y]` question on stderr; anything but `y`/`yes` declines.
fn confirm(prompt: &str, assume_yes: bool) -> CliResult<bool> {
    if assume_yes {
        return Ok(true);
    }

    let io_error = |source| CliError::Io {
        context: "couldn't read confirmation",
        source,
    };
    eprint!("{prompt} [N/y] ");
    io::stderr().flush().map_err(io_error)?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).map_err(io_error)?;
    let accepted = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
    if !accepted {
        warn!("event=cli_confirm module=cli status=declined");
    }
    Ok(accepted)
}

fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(LIST_TIME_FORMAT).to_string()
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Edit { .. } => "edit",
            Self::Track => "track",
            Self::Untrack => "untrack",
            Self::List => "list",
            Self::Show { .. } => "show",
            Self::Delete { .. } => "delete",
            Self::Tracked => "tracked",
            Self::Copy { .. } => "copy",
            Self::CleanAll => "clean-all",
            Self::Title(_) => "edit",
        }
    }

    /// Operation and subject, as shown in failure messages.
    fn describe(&self) -> String {
        match self {
            Self::Edit { title } => format!("edit jot `{title}`"),
            Self::Title(args) => format!("edit jot `{}`", args.join(" ")),
            Self::Track => "track directory".to_string(),
            Self::Untrack => "untrack directory".to_string(),
            Self::List => "list jots".to_string(),
            Self::Show { title } => format!("show jot `{title}`"),
            Self::Delete { title } => format!("delete jot `{title}`"),
            Self::Tracked => "list tracked directories".to_string(),
            Self::Copy { title, .. } => format!("copy jot `{title}`"),
            Self::CleanAll => "remove all jots".to_string(),
        }
    }
}
