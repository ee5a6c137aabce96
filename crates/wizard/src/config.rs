use std::{env, path::PathBuf};

use directories::ProjectDirs;
use lazy_static::lazy_static;
use pdd_core::{Methodology, render::DEFAULT_FILE_NAME};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

/// `[export]` table.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// DOCX template; the built-in template is used when unset.
    pub template_path: Option<PathBuf>,
    /// Where the finished PDD is written; the working directory when unset.
    pub output_dir: Option<PathBuf>,
    pub file_name: String,
    /// Placeholders that must have a value whenever the template uses them.
    pub required_placeholders: Vec<String>,
    pub max_upload_bytes: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            output_dir: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            required_placeholders: Vec::new(),
            max_upload_bytes: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub methodology: Methodology,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

const CONFIG_FILES: [(&str, config::FileFormat); 2] = [
    ("config.json5", config::FileFormat::Json5),
    ("config.toml", config::FileFormat::Toml),
];

impl Config {
    pub fn new() -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().as_ref())?
            .set_default("config_dir", config_dir.to_string_lossy().as_ref())?;

        let mut found_config = false;
        for (file, format) in &CONFIG_FILES {
            let path = config_dir.join(file);
            let source = config::File::from(path.clone())
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if path.exists() {
                found_config = true
            }
        }
        if !found_config {
            debug!(dir = %config_dir.display(), "no configuration file, using defaults");
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        info!(
            template = ?cfg.export.template_path,
            output_dir = ?cfg.export.output_dir,
            "configuration loaded"
        );
        Ok(cfg)
    }

    /// Output directory, falling back to the working directory.
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "agroforestry", env!("CARGO_PKG_NAME"))
}
