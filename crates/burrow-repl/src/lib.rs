//! burrow REPL — a local line-editing front end for the burrow shell.
//!
//! Loads an environment file, then feeds each line to a single-session
//! [`Shell`] and prints the replies. All commands run as the caller
//! `local`, which holds no roles; an environment with a permission
//! table therefore only exposes the commands granted to `everyone`.

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use burrow_kernel::perms::InMemoryRoles;
use burrow_kernel::{Environment, Shell};
use burrow_types::Tone;

/// Session id for the one local console.
const SESSION: &str = "console";
/// Caller name commands run as.
const CALLER: &str = "local";

/// Run the interactive loop until EOF.
///
/// A missing environment file is not fatal: the shell starts on an
/// empty environment and `save` can create the file later.
pub fn run(env_path: &str) -> Result<()> {
    let env = match Environment::load_file(env_path) {
        Ok(env) => env,
        Err(err) => {
            tracing::warn!(path = env_path, error = %err, "starting with an empty environment");
            Environment::new()
        }
    };
    let mut shell = Shell::new(env, InMemoryRoles::new());

    println!("burrow v{}", env!("CARGO_PKG_VERSION"));
    println!("Type \"help\" for commands, Ctrl-D to exit.\n");

    let mut rl = DefaultEditor::new().context("failed to create line editor")?;

    loop {
        let prompt = format!("{}> ", shell.cwd(SESSION));

        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                let reply = shell.execute(SESSION, CALLER, &line);
                if reply.text.is_empty() {
                    continue;
                }
                match reply.tone {
                    Tone::Error => eprintln!("error: {}", reply.text),
                    Tone::Warning => println!("warning: {}", reply.text),
                    Tone::Info | Tone::Success => println!("{}", reply.text),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("error: {err}");
                break;
            }
        }
    }

    Ok(())
}
