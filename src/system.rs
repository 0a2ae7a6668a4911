use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::debug;

/// One external tool call: program, argument vector and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// `cmd.exe /c <program> ...`, the way batch files and MSBuild get launched on Windows.
    pub fn via_cmd(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self::new("cmd.exe", cwd).arg("/c").arg(program)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Abstraction over launching external tools.
/// Lets the command pipelines run against a mock instead of real premake / MSBuild / make.
pub trait CommandRunner {
    /// Runs the invocation to completion and returns its exit code.
    ///
    /// A process that ends without an exit code (killed by a signal) reports `1`.
    /// Failing to spawn at all is an error.
    fn run(&self, invocation: &Invocation) -> Result<i32>;
}

/// Spawns real processes, inheriting stdio so tool output streams straight to the terminal.
pub struct HostRunner;

impl CommandRunner for HostRunner {
    fn run(&self, invocation: &Invocation) -> Result<i32> {
        debug!("Running [{}] in {:?}", invocation, invocation.cwd);

        let status = std::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status()
            .with_context(|| format!("Failed to execute {}", invocation.program))?;

        Ok(status.code().unwrap_or(1))
    }
}

type RunHook = Box<dyn Fn(&Invocation) + Send + Sync>;

/// A mock runner for tests: records every invocation and replays scripted exit codes
/// (`0` once the script runs out).
#[allow(dead_code)]
#[derive(Default)]
pub struct MockRunner {
    pub invocations: Mutex<Vec<Invocation>>,
    pub exit_codes: Mutex<VecDeque<i32>>,
    hook: Option<RunHook>,
}

impl MockRunner {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_exit_codes(codes: &[i32]) -> Self {
        Self {
            exit_codes: Mutex::new(codes.iter().copied().collect()),
            ..Default::default()
        }
    }

    /// Runs `hook` on every invocation before reporting its exit code,
    /// e.g. to fake the artifacts a build would produce.
    #[allow(dead_code)]
    pub fn on_run(mut self, hook: impl Fn(&Invocation) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    #[allow(dead_code)]
    pub fn recorded(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> Result<i32> {
        self.invocations.lock().unwrap().push(invocation.clone());
        if let Some(hook) = &self.hook {
            hook(invocation);
        }
        Ok(self.exit_codes.lock().unwrap().pop_front().unwrap_or(0))
    }
}

/// Runs invocations in order and stops at the first non-zero exit code, returning it.
/// Returns `0` when every step succeeded.
pub fn run_sequence(runner: &impl CommandRunner, steps: &[Invocation]) -> Result<i32> {
    for step in steps {
        let code = runner.run(step)?;
        if code != 0 {
            debug!("[{}] exited with {}", step, code);
            return Ok(code);
        }
    }
    Ok(0)
}
