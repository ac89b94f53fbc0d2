//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The configuration file path defaults to `config.yaml` but can be
//! specified via `-f` flag or `SPLITD_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources
//! override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `SPLITD_` override
//!    YAML values
//!
//! For nested config values, use double underscores in environment variables.
//! For example, `SPLITD_STORAGE__UPLOAD_DIR=/tmp/uploads` sets the
//! `storage.upload_dir` field.
//!
//! Every field has a default, and the defaults reproduce the service's
//! original fixed behavior: port 3000, `uploads/` and `output/` relative to
//! the working directory, and a `spleeter` two-stem invocation. Running with
//! no config file at all is fully supported.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;
use crate::separator::StemKind;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "SPLITD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Upload and output directory layout
    pub storage: StorageConfig,
    /// Separation backend selection and tuning
    pub separator: SeparatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            storage: StorageConfig::default(),
            separator: SeparatorConfig::default(),
        }
    }
}

/// Filesystem layout shared with the external tool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory uploaded tracks are written to
    pub upload_dir: PathBuf,
    /// Directory per-job output directories are created beneath
    pub output_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("output"),
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

/// How separation jobs are executed.
///
/// `command` runs the external tool as a child process. `dummy` fabricates
/// stem files on disk without running anything, which keeps development and
/// tests independent of a working tool install.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SeparatorConfig {
    Command {
        /// Executable to invoke (resolved via PATH unless absolute)
        #[serde(default = "default_program")]
        program: String,
        /// Model preset passed to the tool's `-p` flag
        #[serde(default = "default_model")]
        model: String,
    },
    Dummy {
        /// Which stems the fake backend writes
        #[serde(default = "default_produce")]
        produce: Vec<StemKind>,
        /// Pretend the tool exited non-zero
        #[serde(default)]
        fail: bool,
    },
}

fn default_program() -> String {
    "spleeter".to_string()
}

fn default_model() -> String {
    "spleeter:2stems".to_string()
}

fn default_produce() -> Vec<StemKind> {
    StemKind::ALL.to_vec()
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        SeparatorConfig::Command {
            program: default_program(),
            model: default_model(),
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("SPLITD_").split("__"))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.storage.max_upload_bytes == 0 {
            return Err(Error::Internal {
                operation: "validate config: storage.max_upload_bytes must be greater than zero".to_string(),
            });
        }

        if let SeparatorConfig::Command { program, model } = &self.separator {
            if program.is_empty() {
                return Err(Error::Internal {
                    operation: "validate config: separator.program must not be empty".to_string(),
                });
            }
            if model.is_empty() {
                return Err(Error::Internal {
                    operation: "validate config: separator.model must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
