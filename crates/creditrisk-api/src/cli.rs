use crate::config::LogFormat;
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "creditrisk-api")]
#[command(author, version, about = "Credit default risk scoring API", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "creditrisk.yaml", env = "CREDITRISK_CONFIG")]
    pub config: String,

    /// Path to the model artifact
    #[arg(short, long, env = "CREDITRISK_MODEL_PATH")]
    pub model: Option<String>,

    /// Listen address
    #[arg(short = 'l', long, env = "CREDITRISK_LISTEN")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "CREDITRISK_PORT")]
    pub port: Option<u16>,

    /// Include internal error details in 500 responses
    #[arg(long, env = "CREDITRISK_DEBUG")]
    pub debug: bool,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
