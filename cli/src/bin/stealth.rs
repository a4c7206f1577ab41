use std::io::BufWriter;
use std::path::PathBuf;
use stealth_cli::job::{run_job, write_output};
use stealth_cli::profile::{load_profile, run_profile};
use stealth_cli::stealth_commands::{job_of, network_config, stealth_parser};
#[macro_use]
extern crate log;

fn main() -> std::io::Result<()> {
    let matches = stealth_parser().get_matches();
    let (name, sub_m) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => return Ok(()),
    };
    if name == "profile" {
        if let Some(path) = sub_m.get_one::<PathBuf>("profile") {
            let config = load_profile(path)?;
            return run_profile(&config);
        }
        return Ok(());
    }
    let level = match sub_m.get_count("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    set_threads(sub_m);
    let job = match job_of(name, sub_m) {
        Some(job) => job,
        None => unreachable!(),
    };
    let output = run_job(&job, &network_config(sub_m))?;
    let stdout = std::io::stdout();
    let mut wtr = BufWriter::new(stdout.lock());
    write_output(&mut wtr, &output, sub_m.get_flag("json"))
}

fn set_threads(matches: &clap::ArgMatches) {
    if let Some(&threads) = matches.get_one::<usize>("threads") {
        debug!("Set Threads\t{}", threads);
        if let Err(why) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            debug!("{:?}", why);
        }
    }
}
