use anyhow::{Result, bail};
use log::{debug, info};

use super::{Workspace, windows_path};
use crate::args::{self, ArgumentMap};
use crate::config::Configuration;
use crate::platform::Platform;
use crate::system::{CommandRunner, Invocation};

/// The launch for `project` in `config` (already title-cased, e.g. `Debug`).
///
/// On Windows this goes through `tools\run.bat`, which opens the editor project.
/// Elsewhere the built binary is started directly from its output directory.
pub fn launch_step(ws: &Workspace, config: &str, project: &str) -> Result<Invocation> {
    let step = match ws.platform {
        Platform::Windows => {
            let editor = &ws.layout.editor;
            let script = windows_path(&[ws.layout.tools_dir.as_str(), "run.bat"]);
            Invocation::via_cmd(script, &ws.root).args([
                config,
                project,
                "--project-name",
                editor.project_name.as_str(),
                "--project-path",
                editor.project_path.as_str(),
                "--modules-path",
                editor.modules_path.as_str(),
                "--project-file",
                editor.project_file.as_str(),
            ])
        }
        Platform::Linux | Platform::MacOs => {
            let dir = ws.root.join("bin").join(config).join(project);
            let exe = dir.join(project);
            if !exe.is_file() {
                bail!("{exe:?} not found, build the {config} configuration first");
            }
            Invocation::new(exe.to_string_lossy(), &dir)
        }
    };
    Ok(step)
}

/// Launches the built executable (`-p`, default the main executable) and returns its exit code.
pub fn run(ws: &Workspace, args: &ArgumentMap, runner: &impl CommandRunner) -> Result<i32> {
    debug!("Arguments: {}", args);
    let config = Configuration::new(args.value_or(args::CONFIG, Configuration::DEFAULT)).title_case();
    let project = args.value_or(args::PROJECT, &ws.layout.exe_name);

    let step = launch_step(ws, &config, &project)?;
    info!("Running: {}", step);
    runner.run(&step)
}
