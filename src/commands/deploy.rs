use anyhow::Result;
use log::{debug, info, warn};

use super::{Workspace, build_step, gensln};
use crate::args::{self, ArgumentMap};
use crate::config::Configuration;
use crate::staging;
use crate::system::{CommandRunner, run_sequence};

/// Copies the engine tree into `<app-data>/<main-name>/` and builds it there.
///
/// 1. Remove the previously deployed engine tree, if any.
/// 2. Copy the current engine tree in its place.
/// 3. Regenerate project files in the deploy root.
/// 4. Build, twice.
///
/// The double build is kept as it has always run; what the second pass is for
/// has not been confirmed.
pub fn run(ws: &Workspace, args: &ArgumentMap, runner: &impl CommandRunner) -> Result<i32> {
    debug!("Arguments: {}", args);
    let config = Configuration::new(args.value_or(args::CONFIG, Configuration::DEFAULT));

    let deploy_root = ws.env.app_data()?.join(&ws.layout.main_name);
    let source = ws.root.join(&ws.layout.engine_dir);
    let target = deploy_root.join(&ws.layout.engine_dir);
    let build = build_step(ws, &config, &deploy_root)?;

    info!("Deploying {:?} to {:?}", source, target);
    staging::replace_tree(&source, &target)?;

    let generate = gensln::deploy_step(ws.platform, &ws.layout, &deploy_root);
    let code = runner.run(&generate)?;
    if code != 0 {
        warn!("Project generation in {:?} exited with code {}", deploy_root, code);
        return Ok(code);
    }

    info!("Building deployed engine in [{}] configuration", config);
    run_sequence(runner, &[build.clone(), build])
}
