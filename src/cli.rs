use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "askdb", version, about = "Natural language query service over a company database")]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "ASKDB_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,
}
