use anyhow::Result;
use log::{debug, error, info};

use super::{Workspace, build_step};
use crate::args::{self, ArgumentMap};
use crate::config::Configuration;
use crate::staging;
use crate::system::CommandRunner;

/// Builds the solution, then stages runtime dependencies next to the executable.
///
/// Exit code rules:
/// - the build tool's code, unchanged, if it failed (nothing gets staged),
/// - `1` if the tool succeeded but `bin/<config>/<exe-name>` is missing,
/// - `0` otherwise.
pub fn run(ws: &Workspace, args: &ArgumentMap, runner: &impl CommandRunner) -> Result<i32> {
    debug!("Arguments: {}", args);
    let config = Configuration::new(args.value_or(args::CONFIG, Configuration::DEFAULT));

    info!("Building {} in [{}] configuration", ws.layout.main_name, config);

    let step = build_step(ws, &config, &ws.root)?;
    let code = runner.run(&step)?;
    if code != 0 {
        error!("Build tool exited with code {}", code);
        return Ok(code);
    }

    let output = ws.output_dir(config.as_str());
    if !output.exists() {
        error!("Build failed, {:?} was not produced. See output above for details", output);
        return Ok(1);
    }

    info!("Build finished | Copying dependencies...");
    let sources = staging::dependency_sources(&ws.root, &ws.layout, &config);
    staging::stage_dependencies(&sources, &output)?;

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::workspace;
    use crate::platform::Platform;
    use crate::system::MockRunner;
    use std::fs;
    use std::path::Path;

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn vendor(root: &Path, config: &str, assimp: &str) {
        touch(&root.join(format!("external/mono/bin/{config}/mono-2.0-sgen.dll")), "mono");
        touch(&root.join(format!("external/mono/bin/{config}/mono-2.0-sgen.pdb")), "mono pdb");
        touch(&root.join(format!("external/assimp/lib/{config}/{assimp}.dll")), "assimp");
        touch(&root.join(format!("external/assimp/lib/{config}/{assimp}.pdb")), "assimp pdb");
    }

    #[test]
    fn release_build_stages_missing_dependencies() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        vendor(&root, "release", "assimp-vc143-mt");
        let ws = workspace(&root, Platform::Linux);

        let out = root.join("bin/release/sandbox");
        let out_for_hook = out.clone();
        let runner = MockRunner::new().on_run(move |_| {
            fs::create_dir_all(&out_for_hook).unwrap();
            fs::write(out_for_hook.join("mono-2.0-sgen.dll"), "kept").unwrap();
        });

        let args = ArgumentMap::parse(["-c", "release"]);
        assert_eq!(run(&ws, &args, &runner).unwrap(), 0);

        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].program, "make");
        assert_eq!(recorded[0].args, vec!["config=release"]);

        assert_eq!(fs::read_to_string(out.join("mono-2.0-sgen.dll")).unwrap(), "kept");
        assert!(out.join("mono-2.0-sgen.pdb").exists());
        assert!(out.join("assimp-vc143-mt.dll").exists());
        assert!(out.join("assimp-vc143-mt.pdb").exists());
        assert!(!out.join("assimp-vc143-mtd.dll").exists());
    }

    #[test]
    fn failed_build_forwards_code_and_skips_staging() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        vendor(&root, "debug", "assimp-vc143-mtd");
        let out = root.join("bin/debug/sandbox");
        fs::create_dir_all(&out).unwrap();
        let ws = workspace(&root, Platform::Linux);

        let runner = MockRunner::with_exit_codes(&[42]);
        assert_eq!(run(&ws, &ArgumentMap::default(), &runner).unwrap(), 42);
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn missing_output_forces_exit_one() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path(), Platform::MacOs);

        let runner = MockRunner::new();
        assert_eq!(run(&ws, &ArgumentMap::default(), &runner).unwrap(), 1);
    }

    #[test]
    fn windows_build_defaults_to_debug() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path(), Platform::Windows);
        fs::create_dir_all(ws.output_dir("debug")).unwrap();

        let runner = MockRunner::new();
        assert_eq!(run(&ws, &ArgumentMap::default(), &runner).unwrap(), 0);
        assert_eq!(
            runner.recorded()[0].args.last().map(String::as_str),
            Some("/property:Configuration=debug")
        );
    }
}
