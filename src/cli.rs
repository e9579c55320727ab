//! CLI definitions for taskherd.

use std::path::PathBuf;

use clap::Parser;
use taskherd_config::Config;

/// taskherd CLI.
#[derive(Parser, Debug)]
#[command(name = "taskherd")]
#[command(about = "Periodic job supervisor")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/taskherd.toml", env = "TASKHERD_CONFIG")]
    pub config: PathBuf,

    /// Deployment environment (overrides daemon.environment)
    #[arg(short, long, env = "TASKHERD_ENV")]
    pub environment: Option<String>,

    /// Job source directory (overrides jobs.dir)
    #[arg(long)]
    pub jobs_dir: Option<PathBuf>,

    /// Print the jobs that would be scheduled and exit
    #[arg(long)]
    pub check: bool,

    /// Startup arguments: --only=a,b --except=a,b --do-nothing
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "STARTUP_ARGS")]
    pub startup_args: Vec<String>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(env) = &self.environment {
            config.daemon.environment = env.clone();
        }
        if let Some(dir) = &self.jobs_dir {
            config.jobs.dir = dir.clone();
        }
    }
}
