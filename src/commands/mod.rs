//! # Commands
//!
//! One module per script: `gensln`, `build`, `deploy`, `run`. Each is a short pipeline
//! that picks platform-specific invocations through a single `match` on [`Platform`],
//! runs them in order, and returns the exit code the process should end with.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{Configuration, Environment, Layout};
use crate::platform::Platform;
use crate::system::Invocation;

pub mod build;
pub mod deploy;
pub mod gensln;
pub mod run;

/// Everything a command needs to know about where it is running.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Project root; every relative path in [`Layout`] hangs off it.
    pub root: PathBuf,
    pub layout: Layout,
    pub env: Environment,
    pub platform: Platform,
}

impl Workspace {
    /// Loads the layout under `root` and captures the host environment and platform.
    pub fn discover(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        Ok(Self {
            layout: Layout::load(&root)?,
            env: Environment::from_env(),
            platform: Platform::detect()?,
            root,
        })
    }

    /// `bin/<config>/<exe-name>`, where the build drops the main executable.
    pub fn output_dir(&self, config: &str) -> PathBuf {
        self.root.join("bin").join(config).join(&self.layout.exe_name)
    }
}

/// The native build invocation for `config`, run from `dir`.
///
/// Windows needs the MSBuild location from the environment; the other platforms
/// drive the premake-generated makefiles.
pub fn build_step(ws: &Workspace, config: &Configuration, dir: &Path) -> Result<Invocation> {
    let step = match ws.platform {
        Platform::Windows => {
            let tool = ws.env.build_tool()?;
            Invocation::via_cmd(tool.to_string_lossy(), dir).args([
                ws.layout.solution_file(),
                format!("/property:Configuration={}", config),
            ])
        }
        Platform::Linux | Platform::MacOs => {
            Invocation::new("make", dir).arg(format!("config={}", config))
        }
    };
    Ok(step)
}

/// Joins a relative, `/`-separated layout path with backslashes for `cmd.exe`.
pub(crate) fn windows_path(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\\")
}
