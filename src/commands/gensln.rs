//! Solution generation with premake.
//!
//! - Windows: Visual Studio 2022 solutions for the root project, then each extra
//!   premake script (launcher, editor).
//! - Linux: GNU makefiles via the Linux premake binary.
//! - macOS: GNU makefiles, then an Xcode project.

use std::path::Path;

use anyhow::Result;
use log::info;

use super::{Workspace, windows_path};
use crate::config::Layout;
use crate::platform::Platform;
use crate::system::{CommandRunner, Invocation, run_sequence};

/// Invocations that generate the project files at the workspace root.
pub fn steps(ws: &Workspace) -> Vec<Invocation> {
    let layout = &ws.layout;
    let root = &ws.root;

    match ws.platform {
        Platform::Windows => {
            let premake = windows_path(&[layout.premake_dir.as_str(), "premake5"]);
            let mut steps = vec![Invocation::via_cmd(&premake, root).args(["--debug", "vs2022"])];
            for file in &layout.extra_premake_files {
                steps.push(Invocation::via_cmd(&premake, root).args([
                    format!("--file={}", windows_path(&[file.as_str()])),
                    "--debug".to_string(),
                    "vs2022".to_string(),
                ]));
            }
            steps
        }
        Platform::Linux => vec![unix_premake(layout, root, "premake5.linux").arg("gmake2")],
        Platform::MacOs => vec![
            unix_premake(layout, root, "premake5").arg("gmake2"),
            unix_premake(layout, root, "premake5").arg("xcode4"),
        ],
    }
}

/// The single generation pass run inside a deployed tree at `dir`:
/// the platform's primary format only, without premake's debug output.
pub fn deploy_step(platform: Platform, layout: &Layout, dir: &Path) -> Invocation {
    match platform {
        Platform::Windows => {
            Invocation::via_cmd(windows_path(&[layout.premake_dir.as_str(), "premake5"]), dir).arg("vs2022")
        }
        Platform::Linux => unix_premake(layout, dir, "premake5.linux").arg("gmake2"),
        Platform::MacOs => unix_premake(layout, dir, "premake5").arg("gmake2"),
    }
}

pub fn run(ws: &Workspace, runner: &impl CommandRunner) -> Result<i32> {
    info!("Generating {} project files for {}", ws.layout.main_name, ws.platform);
    run_sequence(runner, &steps(ws))
}

fn unix_premake(layout: &Layout, dir: &Path, binary: &str) -> Invocation {
    let program = dir.join(&layout.premake_dir).join(binary);
    Invocation::new(program.to_string_lossy(), dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::workspace;
    use crate::system::MockRunner;

    #[test]
    fn windows_generates_all_three_solutions() {
        let ws = workspace(Path::new("/proj"), Platform::Windows);
        let runner = MockRunner::new();

        assert_eq!(run(&ws, &runner).unwrap(), 0);

        let args: Vec<Vec<String>> = runner.recorded().into_iter().map(|i| i.args).collect();
        assert_eq!(
            args,
            vec![
                vec!["/c", r"premake\premake5", "--debug", "vs2022"],
                vec!["/c", r"premake\premake5", r"--file=launcher\premake5.lua", "--debug", "vs2022"],
                vec!["/c", r"premake\premake5", r"--file=editor\premake5.lua", "--debug", "vs2022"],
            ]
        );
    }

    #[test]
    fn windows_stops_at_first_failed_generation() {
        let ws = workspace(Path::new("/proj"), Platform::Windows);
        let runner = MockRunner::with_exit_codes(&[0, 2]);

        assert_eq!(run(&ws, &runner).unwrap(), 2);
        assert_eq!(runner.recorded().len(), 2);
    }

    #[test]
    fn linux_uses_linux_premake() {
        let ws = workspace(Path::new("/proj"), Platform::Linux);
        let runner = MockRunner::new();

        assert_eq!(run(&ws, &runner).unwrap(), 0);

        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(
            Path::new(&recorded[0].program),
            Path::new("/proj/premake/premake5.linux")
        );
        assert_eq!(recorded[0].args, vec!["gmake2"]);
    }

    #[test]
    fn mac_skips_xcode_when_makefiles_fail() {
        let ws = workspace(Path::new("/proj"), Platform::MacOs);

        let ok = MockRunner::new();
        assert_eq!(run(&ws, &ok).unwrap(), 0);
        let formats: Vec<String> = ok.recorded().into_iter().map(|i| i.args[0].clone()).collect();
        assert_eq!(formats, vec!["gmake2", "xcode4"]);

        let failing = MockRunner::with_exit_codes(&[5]);
        assert_eq!(run(&ws, &failing).unwrap(), 5);
        assert_eq!(failing.recorded().len(), 1);
    }

    #[test]
    fn deploy_step_targets_the_given_directory() {
        let layout = Layout::default();
        let step = deploy_step(Platform::Windows, &layout, Path::new("/appdata/EngineY"));
        assert_eq!(step.args, vec!["/c", r"premake\premake5", "vs2022"]);
        assert_eq!(step.cwd, Path::new("/appdata/EngineY"));
    }
}
