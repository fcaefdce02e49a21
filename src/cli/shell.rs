//! Interactive shell
//!
//! A prompt with history and tab completion that accepts the same
//! subcommands as the command line.

use anyhow::Result;
use clap::Parser;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

use super::{Cli, Commands, Context};

const COMMANDS: &[(&str, &[&str])] = &[
    ("status", &[]),
    ("channels", &[]),
    ("watch", &[]),
    ("start", &[]),
    ("stop", &[]),
    ("reload", &[]),
    ("switch", &[]),
    ("health", &[]),
    ("settings", &["show", "set"]),
    ("config", &["show", "get", "set", "path"]),
    ("help", &[]),
    ("exit", &[]),
    ("quit", &[]),
];

struct ShellHelper;

fn pairs<'a>(words: impl Iterator<Item = &'a str>) -> Vec<Pair> {
    words
        .map(|word| Pair {
            display: word.to_string(),
            replacement: word.to_string(),
        })
        .collect()
}

/// Candidates for the word under the cursor
fn complete_line(line: &str) -> (usize, Vec<Pair>) {
    let words: Vec<&str> = line.split_whitespace().collect();
    let typing_new_word = line.is_empty() || line.ends_with(' ');
    let start = if typing_new_word {
        line.len()
    } else {
        line.rfind(' ').map(|i| i + 1).unwrap_or(0)
    };

    let (position, prefix) = if typing_new_word {
        (words.len(), "")
    } else {
        (words.len() - 1, words[words.len() - 1])
    };

    let candidates = match position {
        0 => pairs(
            COMMANDS
                .iter()
                .map(|(cmd, _)| *cmd)
                .filter(|cmd| cmd.starts_with(prefix)),
        ),
        1 => COMMANDS
            .iter()
            .find(|(cmd, _)| *cmd == words[0])
            .map(|(_, subs)| pairs(subs.iter().copied().filter(|sub| sub.starts_with(prefix))))
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    (start, candidates)
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(complete_line(&line[..pos]))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellHelper {}
impl Validator for ShellHelper {}
impl Helper for ShellHelper {}

/// Split a line into arguments, honoring single and double quotes
fn parse_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ' ') => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }
    args
}

/// Run one line. Returns Ok(false) when the shell should exit.
async fn run_line(args: Vec<String>, url: Option<&str>) -> Result<bool> {
    match args.first().map(String::as_str) {
        None => return Ok(true),
        Some("help") => {
            print_help();
            return Ok(true);
        }
        Some("exit" | "quit") => return Ok(false),
        Some(_) => {}
    }

    let argv = std::iter::once("dropdeck".to_string()).chain(args);
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => {
            println!("{}", e);
            return Ok(true);
        }
    };

    let command = match cli.command {
        None => {
            println!("Type a command, or 'help' for a list.");
            return Ok(true);
        }
        Some(Commands::Shell) => {
            println!("Already in shell mode.");
            return Ok(true);
        }
        Some(command) => command,
    };

    let ctx = Context::load(
        cli.url.as_deref().or(url),
        cli.output.format(),
        cli.output.quiet,
    )?;
    super::dispatch(command, &ctx).await?;
    Ok(true)
}

fn print_help() {
    println!(
        r#"Dropdeck Interactive Shell

Commands:
  status [--filter F] [--sort S] [--search TEXT] [--prio] [--view LINK]
                           Show agent state and campaigns
  channels                 List tracked channels
  watch [--view LINK]      Refresh status every second (Ctrl+C stops)

  start                    Start mining
  stop                     Stop mining
  reload                   Reload inventory and channels
  switch [channel]         Switch channel, or let the agent choose
  health                   Check that the agent is reachable

  settings show            Show agent settings
  settings set <key> <value>
                           Change one agent setting

  config show              Show current configuration
  config get <key>         Get a specific setting
  config set <key> <value> Set a configuration value
  config path              Show config file path

  help                     Show this help
  exit, quit               Exit the shell

Flags (can be added to any command):
  --json                   Output in JSON format
  --quiet, -q              Suppress non-essential output
  --url URL                Talk to a different agent
"#
    );
}

fn history_path() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("com", "dropdeck", "Dropdeck")
        .map(|dirs| dirs.data_dir().join("shell_history"))
}

/// Run the interactive shell
pub async fn run(url: Option<String>) -> Result<()> {
    println!("Dropdeck Interactive Shell v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for available commands, 'exit' to quit.\n");

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(ShellHelper));

    if let Some(path) = history_path() {
        let _ = rl.load_history(&path);
    }

    loop {
        match rl.readline("dropdeck> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                match run_line(parse_args(line), url.as_deref()).await {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(e) => eprintln!("Error: {:#}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("exit");
                break;
            }
            Err(err) => {
                tracing::error!("Shell input failed: {:?}", err);
                break;
            }
        }
    }

    if let Some(path) = history_path() {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = rl.save_history(&path) {
            tracing::warn!("Could not save shell history: {}", e);
        }
    }

    Ok(())
}
