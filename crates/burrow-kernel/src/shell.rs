//! The shell: per-session working directories and the command surface.
//!
//! One `Shell` owns the shared environment. Each caller context (a chat
//! channel, a REPL) gets its own current directory, tracked by session
//! id as an absolute path; the tree, variables, and permissions behind
//! them are one shared structure. Callers are assumed serialized by the
//! dispatch layer; every command runs to completion before the next.
//!
//! Every command is permission-checked against the caller's roles
//! before it runs, and returns a [`Reply`] rather than printing.

use std::collections::HashMap;

use burrow_types::{Error, Reply, Result};

use crate::env::Environment;
use crate::perms::RoleDirectory;
use crate::vfs::{render, resolve, tree};

/// Session id used when no caller context is distinguished.
pub const DEFAULT_SESSION: &str = "default";

/// How many levels `ls` expands before printing the continuation marker.
const LS_DEPTH: usize = 4;

const HELP_TEXT: &str = "\
Available commands:
  help                     show this message
  echo <words...>          print the words back
  pwd                      print the current directory
  ls                       list the current directory tree
  cd <path>                change the current directory
  cat <path>               print a file's contents
  get <variable>           read a variable
  set <variable> <value>   write (or create) a variable
  delete <variable>        delete a variable
  lock <path> <key>        lock a folder or file
  unlock <path> <key>      unlock a folder or file
  save <file>              save the environment to disk
  load <file>              load the environment from disk
  su subscribe <role>      join a role below your own authority
  su unsubscribe <role>    leave a role";

/// Split a command line into words, honoring double quotes.
///
/// Quotes group words with embedded spaces; a doubled quote inside a
/// quoted word produces a literal quote. An unterminated quote is an
/// error.
pub fn split_command_line(input: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                // A doubled quote escapes to a literal quote
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_quotes {
        return Err(Error::InvalidInput("unterminated quote".to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// The command dispatcher.
pub struct Shell<D: RoleDirectory> {
    env: Environment,
    /// Session id to current absolute path.
    sessions: HashMap<String, String>,
    roles: D,
}

impl<D: RoleDirectory> Shell<D> {
    pub fn new(env: Environment, roles: D) -> Self {
        Self { env, sessions: HashMap::new(), roles }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// The session's current absolute path, starting at root.
    pub fn cwd(&self, session: &str) -> String {
        self.sessions.get(session).cloned().unwrap_or_else(|| "/".to_string())
    }

    /// Execute one command line on behalf of a caller.
    ///
    /// `session` scopes the current directory; `caller` is resolved to
    /// roles for the permission check.
    pub fn execute(&mut self, session: &str, caller: &str, line: &str) -> Reply {
        let words = match split_command_line(line) {
            Ok(words) => words,
            Err(err) => return err.into(),
        };
        let Some(command) = words.first() else {
            return Reply::info("");
        };

        let roles = self.roles.roles_of(caller);
        if !self.env.perms.allows(&roles, command) {
            return Error::PermissionDenied(command.clone()).into();
        }

        let args = &words[1..];
        match command.as_str() {
            "help" => Reply::info(HELP_TEXT),
            "echo" => Reply::info(args.join(" ")),
            "pwd" => Reply::info(self.cwd(session)),
            "ls" => self.run_ls(session),
            "cd" => self.run_cd(session, args),
            "cat" => self.run_cat(session, args),
            "get" => self.run_get(args),
            "set" => self.run_set(args),
            "delete" => self.run_delete(args),
            "lock" => self.run_lock(session, args),
            "unlock" => self.run_unlock(session, args),
            "save" => self.run_save(args),
            "load" => self.run_load(args),
            "su" => self.run_su(caller, &roles, args),
            _ => Reply::error(format!(
                "unknown command \"{command}\"; use \"help\" for the list"
            )),
        }
    }

    fn resolve(&self, session: &str, raw: &str) -> Result<String> {
        resolve::resolve(&self.env.root, raw, &self.cwd(session))
    }

    fn run_ls(&self, session: &str) -> Reply {
        match self.env.folder(&self.cwd(session)) {
            Ok(folder) => Reply::info(render::render(folder, LS_DEPTH)),
            Err(err) => err.into(),
        }
    }

    fn run_cd(&mut self, session: &str, args: &[String]) -> Reply {
        let Some(raw) = args.first() else {
            return usage("cd <directory>");
        };
        let result = self
            .resolve(session, raw)
            .and_then(|path| self.env.folder(&path).map(|f| f.abs_path()));
        match result {
            Ok(abs) => {
                self.sessions.insert(session.to_string(), abs.clone());
                Reply::success(format!("Changed directory to {abs}"))
            }
            Err(err) => err.into(),
        }
    }

    fn run_cat(&self, session: &str, args: &[String]) -> Reply {
        let Some(raw) = args.first() else {
            return usage("cat <file>");
        };
        let result = self
            .resolve(session, raw)
            .and_then(|path| self.env.file(&path))
            .and_then(|file| self.env.file_content(file));
        match result {
            Ok(content) => Reply::info(content),
            Err(err) => err.into(),
        }
    }

    fn run_get(&self, args: &[String]) -> Reply {
        let Some(name) = args.first() else {
            return usage("get <variable>");
        };
        match self.env.vars.get(name) {
            Ok(value) => Reply::info(value),
            Err(err) => err.into(),
        }
    }

    fn run_set(&mut self, args: &[String]) -> Reply {
        let (Some(name), Some(value)) = (args.first(), args.get(1)) else {
            return usage("set <variable> <value>");
        };
        if self.env.vars.exists(name) {
            match self.env.vars.set(name, value) {
                Ok(()) => Reply::success(format!("Updated variable \"{name}\".")),
                Err(err) => err.into(),
            }
        } else {
            match self.env.vars.create(name, value) {
                Ok(()) => Reply::success(format!(
                    "Created variable \"{name}\" with value \"{value}\"."
                )),
                Err(err) => err.into(),
            }
        }
    }

    fn run_delete(&mut self, args: &[String]) -> Reply {
        let Some(name) = args.first() else {
            return usage("delete <variable>");
        };
        match self.env.vars.delete(name) {
            Ok(()) => Reply::success(format!("Deleted variable \"{name}\".")),
            Err(err) => err.into(),
        }
    }

    fn run_lock(&mut self, session: &str, args: &[String]) -> Reply {
        let (Some(raw), Some(key)) = (args.first(), args.get(1)) else {
            return usage("lock <path> <key>");
        };
        let result = self
            .resolve(session, raw)
            .and_then(|path| self.env.lock(&path, key).map(|()| path));
        match result {
            Ok(path) => {
                // A session standing inside the locked subtree is sent
                // back to the root, with a warning tone so the forced
                // move is visible.
                let cwd = self.cwd(session);
                let locked = canonical(&path);
                if cwd == locked || cwd.starts_with(&format!("{locked}/")) {
                    self.sessions.insert(session.to_string(), "/".to_string());
                    return Reply::warning(format!(
                        "Locked \"{raw}\" and moved you back to the root."
                    ));
                }
                Reply::success(format!("Locked \"{raw}\"."))
            }
            Err(err) => err.into(),
        }
    }

    fn run_unlock(&mut self, session: &str, args: &[String]) -> Reply {
        let (Some(raw), Some(key)) = (args.first(), args.get(1)) else {
            return usage("unlock <path> <key>");
        };
        let result = self
            .resolve(session, raw)
            .and_then(|path| self.env.unlock(&path, key));
        match result {
            Ok(()) => Reply::success(format!("Unlocked \"{raw}\".")),
            Err(err) => err.into(),
        }
    }

    fn run_save(&mut self, args: &[String]) -> Reply {
        let Some(path) = args.first() else {
            return usage("save <file>");
        };
        match self.env.save_file(path) {
            Ok(()) => Reply::success(format!("Saved the environment to \"{path}\".")),
            Err(err) => err.into(),
        }
    }

    fn run_load(&mut self, args: &[String]) -> Reply {
        let Some(path) = args.first() else {
            return usage("load <file>");
        };
        match Environment::load_file(path) {
            Ok(env) => {
                // The old tree is gone; every session's directory would
                // dangle, so all of them restart at the root.
                self.env = env;
                self.sessions.clear();
                Reply::success(format!("Loaded the environment from \"{path}\"."))
            }
            Err(err) => err.into(),
        }
    }

    fn run_su(&mut self, caller: &str, roles: &[String], args: &[String]) -> Reply {
        let (Some(action), Some(role)) = (args.first(), args.get(1)) else {
            return usage("su <subscribe | unsubscribe> <role>");
        };
        let result = match action.as_str() {
            "subscribe" => self.subscribe(caller, roles, role),
            "unsubscribe" => self.unsubscribe(caller, roles, role),
            _ => return usage("su <subscribe | unsubscribe> <role>"),
        };
        match result {
            Ok(message) => Reply::success(message),
            Err(err) => err.into(),
        }
    }

    fn subscribe(&mut self, caller: &str, roles: &[String], role: &str) -> Result<String> {
        self.env.perms.check_subscription(roles, role)?;
        if roles.iter().any(|r| r == role) {
            return Err(Error::AlreadySubscribed(role.to_string()));
        }
        self.roles.add_role(caller, role)?;
        Ok(format!("Subscribed to role \"{role}\"."))
    }

    fn unsubscribe(&mut self, caller: &str, roles: &[String], role: &str) -> Result<String> {
        if !roles.iter().any(|r| r == role) {
            return Err(Error::NotSubscribed(role.to_string()));
        }
        self.roles.remove_role(caller, role)?;
        Ok(format!("Unsubscribed from role \"{role}\"."))
    }
}

/// Normalize a resolved path: one slash per segment, no trailing slash.
fn canonical(path: &str) -> String {
    let mut out = String::new();
    for part in tree::segments(path) {
        out.push('/');
        out.push_str(part);
    }
    if out.is_empty() { "/".to_string() } else { out }
}

fn usage(expected: &str) -> Reply {
    Error::InvalidInput(format!("expecting \"{expected}\"")).into()
}
