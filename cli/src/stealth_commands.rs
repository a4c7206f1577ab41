use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use stealth::{ArcMode, BootstrapConfig, NetworkConfig};

use crate::job::Job;

fn common_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Debug mode"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("number of threads"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .default_value("0")
                .help("Seed of the random number generators"),
        )
        .arg(
            Arg::new("sparse_k")
                .long("sparse-k")
                .value_name("K")
                .value_parser(value_parser!(usize))
                .help("Restrict the arcs to the K nearest neighbors. All pairs if not given."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Output the whole result in JSON"),
        )
}

fn input_arg() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Labeled dataset in the svmlight format. `-` for the standard input.")
}

fn class_sizes_arg() -> Arg {
    Arg::new("class_sizes")
        .long("class-sizes")
        .value_name("SIZE")
        .value_parser(value_parser!(u64))
        .num_args(1..)
        .help("Class sizes in the order of the labels. Overrides the header of the input.")
}

fn pair_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("first")
                .long("first")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .help("First dataset."),
        )
        .arg(
            Arg::new("second")
                .long("second")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .help("Second dataset."),
        )
}

fn bootstrap_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("num_sample")
                .long("num-sample")
                .value_parser(value_parser!(usize))
                .default_value("10")
                .help("Number of replicates"),
        )
        .arg(
            Arg::new("bootstrap_seed")
                .long("bootstrap-seed")
                .value_parser(value_parser!(u64))
                .default_value("0")
                .help("Seed of the subsampling"),
        )
}

fn subcommand_weights() -> Command {
    let command = Command::new("weights")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Resampling weights which match the class sizes with the least transport cost.")
        .arg(input_arg())
        .arg(class_sizes_arg())
        .arg(
            Arg::new("normalized")
                .long("normalized")
                .action(ArgAction::SetTrue)
                .help("Output the weights divided by their sum"),
        );
    common_args(command)
}

fn subcommand_distance() -> Command {
    let command = Command::new("distance")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Transport distance between two datasets.");
    common_args(pair_args(command))
}

fn subcommand_weights_bootstrap() -> Command {
    let command = Command::new("weights-bootstrap")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Resampling weights averaged over subsamples of each class.")
        .arg(input_arg())
        .arg(class_sizes_arg())
        .arg(
            Arg::new("ratio")
                .long("ratio")
                .value_parser(value_parser!(f64))
                .default_value("0.3")
                .help("Fraction of each class in a subsample"),
        );
    common_args(bootstrap_args(command))
}

fn subcommand_distance_bootstrap() -> Command {
    let command = Command::new("distance-bootstrap")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Transport distance averaged over subsamples of the two datasets.")
        .arg(
            Arg::new("size")
                .long("size")
                .value_parser(value_parser!(usize))
                .required(true)
                .help("Number of data drawn from each dataset"),
        );
    common_args(bootstrap_args(pair_args(command)))
}

fn subcommand_profile() -> Command {
    Command::new("profile")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Run the job written in a TOML file.")
        .arg(
            Arg::new("profile")
                .required(true)
                .value_name("TOML")
                .value_parser(value_parser!(PathBuf))
                .help("TOML file of the job"),
        )
}

pub fn stealth_parser() -> Command {
    Command::new("stealth")
        .version("0.1")
        .author("Bansho Masutani <ban-m@g.ecc.u-tokyo.ac.jp>")
        .about("Class-balanced resampling and transport distances by min-cost flow")
        .arg_required_else_help(true)
        .subcommand(subcommand_weights())
        .subcommand(subcommand_distance())
        .subcommand(subcommand_weights_bootstrap())
        .subcommand(subcommand_distance_bootstrap())
        .subcommand(subcommand_profile())
}

pub fn network_config(matches: &ArgMatches) -> NetworkConfig {
    let seed = matches.get_one::<u64>("seed").copied().unwrap_or(0);
    match matches.get_one::<usize>("sparse_k") {
        Some(&k) => NetworkConfig::new(ArcMode::Sparse { k }, seed),
        None => NetworkConfig::new(ArcMode::Dense, seed),
    }
}

fn bootstrap_config(matches: &ArgMatches) -> BootstrapConfig {
    let default = BootstrapConfig::default();
    // Only `weights-bootstrap` has the ratio.
    let ratio = match matches.try_get_one::<f64>("ratio") {
        Ok(Some(&ratio)) => ratio,
        _ => default.ratio,
    };
    let num_sample = matches
        .get_one::<usize>("num_sample")
        .copied()
        .unwrap_or(default.num_sample);
    let seed = matches.get_one::<u64>("bootstrap_seed").copied().unwrap_or(default.seed);
    BootstrapConfig::new(ratio, num_sample, seed)
}

fn path_of(matches: &ArgMatches, id: &str) -> PathBuf {
    matches.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

/// The job of a subcommand other than `profile`.
pub fn job_of(name: &str, matches: &ArgMatches) -> Option<Job> {
    let class_sizes = || {
        matches
            .get_many::<u64>("class_sizes")
            .map(|sizes| sizes.copied().collect())
    };
    let job = match name {
        "weights" => Job::Weights {
            input: path_of(matches, "input"),
            class_sizes: class_sizes(),
            normalized: matches.get_flag("normalized"),
        },
        "distance" => Job::Distance {
            first: path_of(matches, "first"),
            second: path_of(matches, "second"),
        },
        "weights-bootstrap" => Job::WeightsBootstrap {
            input: path_of(matches, "input"),
            class_sizes: class_sizes(),
            bootstrap: bootstrap_config(matches),
        },
        "distance-bootstrap" => Job::DistanceBootstrap {
            first: path_of(matches, "first"),
            second: path_of(matches, "second"),
            size: matches.get_one::<usize>("size").copied().unwrap_or(0),
            bootstrap: bootstrap_config(matches),
        },
        _ => return None,
    };
    Some(job)
}
