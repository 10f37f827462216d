use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::*;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use exerec::config::Config;
use exerec::{logging, Player, Recorder, Runner};

#[derive(Parser)]
#[command(name = "exerec", version)]
#[command(about = "Records the stdout/stderr of a command into a directory. \
The recordings can be played back in unit tests and fakes.")]
#[command(after_help = "Example:\n  exerec -d /tmp/test -- ls -a\n    \
Run ls -a and store the recorded output in the /tmp/test directory.")]
struct Cli {
    /// Directory to store recordings [default: recording.dir from ~/.exerec/config.toml]
    #[arg(short = 'd', long = "dir")]
    dir: Option<PathBuf>,
    /// Log verbosity, repeat for more output
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
    /// Play back an existing recording instead of running the command
    #[arg(long)]
    play: bool,
    /// Text fed to the command's stdin
    #[arg(long, default_value = "")]
    stdin: String,
    /// Command to execute, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new()?;
    logging::init(config.effective_verbosity(cli.verbose));

    let dir = cli.dir.or(config.recording.dir).ok_or_else(|| {
        anyhow!(
            "-d must be set (or recording.dir in {})",
            Config::get_config_path().display()
        )
    })?;
    let (command, args) = cli
        .command
        .split_first()
        .ok_or_else(|| anyhow!("no command given"))?;

    let output = if cli.play {
        Player::new(&dir).run(None, &cli.stdin, command, args)?
    } else {
        fs::create_dir_all(&dir)
            .with_context(|| format!("create recording directory {}", dir.display()))?;
        Recorder::new(&dir).run(None, &cli.stdin, command, args)?
    };

    print!("{}", output.stdout);
    eprint!("{}", output.stderr);
    io::stdout().flush()?;

    if let Some(err) = output.error {
        eprintln!("{} {}", "E".red().bold(), err);
        std::process::exit(1);
    }

    Ok(())
}
