//! Profiles -- a job and its settings in one TOML file.
//!
//! ```toml
//! threads = 4
//! verbose = 1
//! seed = 10
//! arcs = { sparse = { k = 20 } }
//! [job]
//! mode = "weights_bootstrap"
//! input = "train.svmlight"
//! bootstrap = { ratio = 0.3, num_sample = 10, seed = 0 }
//! ```
use crate::job::{run_job, write_output, Job};
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Read};
use stealth::{ArcMode, NetworkConfig};

fn default_threads() -> usize {
    1
}

/// The configuration of a profile. Every field other than `job` has a default.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProfileConfig {
    job: Job,
    #[serde(default)]
    arcs: ArcMode,
    /// Seed of the neighbor graphs.
    #[serde(default)]
    seed: u64,
    #[serde(default = "default_threads")]
    threads: usize,
    #[serde(default)]
    verbose: usize,
    /// Print the whole result as JSON.
    #[serde(default)]
    json: bool,
}

impl ProfileConfig {
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig::new(self.arcs, self.seed)
    }
}

pub fn load_profile<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<ProfileConfig> {
    let mut rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
    let mut file = String::new();
    rdr.read_to_string(&mut file)?;
    toml::from_str(&file).map_err(|why| std::io::Error::new(std::io::ErrorKind::InvalidData, why))
}

pub fn run_profile(config: &ProfileConfig) -> std::io::Result<()> {
    let level = match config.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    if let Err(why) = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build_global()
    {
        warn!("{:?}", why);
    }
    let output = run_job(&config.job, &config.network_config())?;
    let stdout = std::io::stdout();
    let mut wtr = BufWriter::new(stdout.lock());
    write_output(&mut wtr, &output, config.json)
}
