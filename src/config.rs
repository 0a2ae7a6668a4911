//! # Configuration
//!
//! Two kinds of configuration feed the commands:
//!
//! 1. [`Layout`]: the fixed names of the EngineY tree (solution name, main executable,
//!    premake location, vendored libraries). Compiled-in defaults, optionally overridden
//!    by an `enginey.json` at the project root.
//! 2. [`Environment`]: host-specific values from environment variables (`VS_BUILD_PATH`,
//!    `APPDATA`). They are captured once and validated when a command actually needs them.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// File name of the optional layout override at the project root.
pub const LAYOUT_FILE: &str = "enginey.json";

/// Environment variable naming the native build driver (MSBuild).
pub const BUILD_TOOL_VAR: &str = "VS_BUILD_PATH";

/// Environment variable naming the per-user application-data directory.
pub const APP_DATA_VAR: &str = "APPDATA";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {name} ({hint})")]
    Missing { name: &'static str, hint: &'static str },
}

/// Parameters handed to the editor when `run` goes through the Windows launcher script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorLaunch {
    pub project_name: String,
    pub project_path: String,
    pub modules_path: String,
    pub project_file: String,
}

impl Default for EditorLaunch {
    fn default() -> Self {
        Self {
            project_name: "editor".to_string(),
            project_path: "./editor".to_string(),
            modules_path: "bin/Debug/editor/editor_modules.dll".to_string(),
            project_file: "editor/editor.yproj".to_string(),
        }
    }
}

/// Names and relative locations inside the EngineY source tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Solution name; the build driver is pointed at `<main_name>.sln`.
    pub main_name: String,
    /// Main executable, also the default `run` project.
    pub exe_name: String,
    pub tools_dir: String,
    pub premake_dir: String,
    /// Root of the vendored third-party libraries.
    pub external_dir: String,
    /// Directory tree copied by `deploy`.
    pub engine_dir: String,
    /// Extra premake scripts generated on Windows, after the root one.
    pub extra_premake_files: Vec<String>,
    pub editor: EditorLaunch,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            main_name: "EngineY".to_string(),
            exe_name: "sandbox".to_string(),
            tools_dir: "tools".to_string(),
            premake_dir: "premake".to_string(),
            external_dir: "external".to_string(),
            engine_dir: "engine".to_string(),
            extra_premake_files: vec![
                "launcher/premake5.lua".to_string(),
                "editor/premake5.lua".to_string(),
            ],
            editor: EditorLaunch::default(),
        }
    }
}

impl Layout {
    /// Loads `enginey.json` from `root` if present, otherwise the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(LAYOUT_FILE);
        if !path.exists() {
            debug!("No {} at {:?}, using default layout", LAYOUT_FILE, root);
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {path:?}"))?;
        let layout: Layout =
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {path:?}"))?;
        debug!("Loaded layout from {:?}", path);
        Ok(layout)
    }

    /// `<main_name>.sln`
    pub fn solution_file(&self) -> String {
        format!("{}.sln", self.main_name)
    }
}

/// Host configuration captured from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub build_tool: Option<PathBuf>,
    pub app_data: Option<PathBuf>,
}

impl Environment {
    /// Reads `VS_BUILD_PATH` and `APPDATA`. When `APPDATA` is unset, the roaming
    /// per-user config directory reported by the OS is used instead.
    pub fn from_env() -> Self {
        let build_tool = std::env::var_os(BUILD_TOOL_VAR).and_then(path_from_os);
        let app_data = std::env::var_os(APP_DATA_VAR)
            .and_then(path_from_os)
            .or_else(|| directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()));

        Self { build_tool, app_data }
    }

    pub fn build_tool(&self) -> Result<&Path, ConfigError> {
        self.build_tool.as_deref().ok_or(ConfigError::Missing {
            name: BUILD_TOOL_VAR,
            hint: "set it to the full path of MSBuild.exe",
        })
    }

    pub fn app_data(&self) -> Result<&Path, ConfigError> {
        self.app_data.as_deref().ok_or(ConfigError::Missing {
            name: APP_DATA_VAR,
            hint: "set it to the per-user application data directory",
        })
    }
}

/// Turns a raw environment value into a path. Values that are not valid
/// Unicode are taken verbatim; only empty ones count as unset.
pub fn path_from_os(value: OsString) -> Option<PathBuf> {
    match value.to_str() {
        Some(text) => unquote_path(text),
        None if value.is_empty() => None,
        None => Some(PathBuf::from(value)),
    }
}

/// Trims whitespace and one layer of surrounding quotes. Empty values count as unset.
pub fn unquote_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| trimmed.strip_prefix(*q).and_then(|s| s.strip_suffix(*q)))
        .unwrap_or(trimmed)
        .trim();

    if unquoted.is_empty() {
        None
    } else {
        Some(PathBuf::from(unquoted))
    }
}

/// A named build variant such as `debug` or `release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration(String);

impl Configuration {
    pub const DEFAULT: &'static str = "debug";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_debug(&self) -> bool {
        self.0 == "debug"
    }

    /// The output-directory spelling premake uses for the two conventional names.
    /// Anything else passes through untouched.
    pub fn title_case(&self) -> String {
        match self.0.as_str() {
            "debug" => "Debug".to_string(),
            "release" => "Release".to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
