//! One unit of work of the `stealth` binary, shared by the subcommands and the profiles.
use definitions::{ClassSizes, DataSet};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use stealth::biased_sampling::{BiasedSampling, SamplingWeights};
use stealth::bootstrap::{biased_sampling_bootstrap, wasserstein_bootstrap};
use stealth::entry::read_dataset;
use stealth::wasserstein::{TransportDistance, Wasserstein};
use stealth::{BootstrapConfig, NetworkConfig};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Job {
    /// Resampling weights of a labeled dataset.
    Weights {
        input: PathBuf,
        /// Overrides the class sizes in the header of the input.
        class_sizes: Option<Vec<u64>>,
        /// Output the weights divided by their sum instead of the raw flow.
        #[serde(default)]
        normalized: bool,
    },
    /// Transport distance between two datasets.
    Distance { first: PathBuf, second: PathBuf },
    WeightsBootstrap {
        input: PathBuf,
        class_sizes: Option<Vec<u64>>,
        #[serde(default)]
        bootstrap: BootstrapConfig,
    },
    DistanceBootstrap {
        first: PathBuf,
        second: PathBuf,
        /// The number of data drawn from each dataset.
        size: usize,
        #[serde(default)]
        bootstrap: BootstrapConfig,
    },
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "snake_case")]
pub enum JobOutput {
    Weights(SamplingWeights),
    Distance(TransportDistance),
    Scores(Vec<f64>),
    MeanDistance(f64),
}

fn read_labeled(
    input: &Path,
    class_sizes: &Option<Vec<u64>>,
) -> std::io::Result<(DataSet, ClassSizes)> {
    debug!("Opening {}", input.display());
    let (dataset, header) = read_dataset(input)?;
    match (class_sizes, header) {
        (Some(sizes), _) => Ok((dataset, ClassSizes::new(sizes.clone()))),
        (None, Some(sizes)) => Ok((dataset, sizes)),
        (None, None) => {
            let message = format!("{} has no class sizes", input.display());
            Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, message))
        }
    }
}

fn read_unlabeled(input: &Path) -> std::io::Result<DataSet> {
    debug!("Opening {}", input.display());
    Ok(read_dataset(input)?.0)
}

pub fn run_job(job: &Job, config: &NetworkConfig) -> std::io::Result<JobOutput> {
    debug!("START\t{:?}\t{:?}", job, config);
    let output = match job {
        Job::Weights {
            input,
            class_sizes,
            normalized,
        } => {
            let (dataset, sizes) = read_labeled(input, class_sizes)?;
            let weights = dataset.biased_sampling(&sizes, config)?;
            info!("Cost\t{:.4}\tMass\t{}", weights.total_cost, weights.mass);
            match normalized {
                true => JobOutput::Scores(weights.normalized()),
                false => JobOutput::Weights(weights),
            }
        }
        Job::Distance { first, second } => {
            let first = read_unlabeled(first)?;
            let second = read_unlabeled(second)?;
            JobOutput::Distance(first.wasserstein(&second, config)?)
        }
        Job::WeightsBootstrap {
            input,
            class_sizes,
            bootstrap,
        } => {
            let (dataset, sizes) = read_labeled(input, class_sizes)?;
            let scores = biased_sampling_bootstrap(&dataset, &sizes, config, bootstrap)?;
            JobOutput::Scores(scores)
        }
        Job::DistanceBootstrap {
            first,
            second,
            size,
            bootstrap,
        } => {
            let first = read_unlabeled(first)?;
            let second = read_unlabeled(second)?;
            let mean = wasserstein_bootstrap(&first, &second, *size, config, bootstrap)?;
            JobOutput::MeanDistance(mean)
        }
    };
    debug!("END");
    Ok(output)
}

/// Weights or scores are written one per line in the dataset order,
/// distances as a single line.
pub fn write_output<W: Write>(wtr: &mut W, output: &JobOutput, json: bool) -> std::io::Result<()> {
    if json {
        serde_json::ser::to_writer(&mut *wtr, output)?;
        return writeln!(wtr);
    }
    match output {
        JobOutput::Weights(weights) => {
            for &w in weights.weights.iter() {
                writeln!(wtr, "{}", w as f64)?;
            }
        }
        JobOutput::Scores(scores) => {
            for s in scores.iter() {
                writeln!(wtr, "{}", s)?;
            }
        }
        JobOutput::Distance(distance) => writeln!(wtr, "{}", distance.distance)?,
        JobOutput::MeanDistance(mean) => writeln!(wtr, "{}", mean)?,
    }
    Ok(())
}
