#[macro_use]
extern crate clap;

use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
};

use metronome::{
    config::{self, clap::arg},
    score::{self, Score},
    ux::out,
};

use clap::{App, Arg};

fn main() {
    setup_tracing();
    if let Err(e) = run(app().get_matches()) {
        eprintln!("{:#}", e);
        std::process::exit(1)
    }
}

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("metronome")
        .author(crate_authors!())
        .version(crate_version!())
        .about("Steps scripted players through a fixed interleaving of checkpoints")
        .arg(
            Arg::with_name(arg::CONFIG)
                .help("Config file to load before applying arguments")
                .short("-c")
                .long("--config")
                .value_name("FILE"),
        )
        .arg(
            Arg::with_name(arg::ORDER)
                .help("Order in which to reach the score's checkpoints")
                .short("-o")
                .long("--order")
                .value_name("STRATEGY")
                .possible_values(config::order::string::ALL),
        )
        .arg(
            Arg::with_name(arg::SEED)
                .help("Seed for the shuffle order")
                .short("-s")
                .long("--seed")
                .value_name("NUM"),
        )
        .arg(
            Arg::with_name(arg::OUTPUT)
                .help("How to output the performance")
                .short("-f")
                .long("--output")
                .value_name("FORMAT")
                .possible_values(out::choice::string::ALL),
        )
        .arg(
            Arg::with_name(arg::STACK_SIZE)
                .help("Stack size, in bytes, for each player thread")
                .long("--stack-size")
                .value_name("BYTES"),
        )
        .arg(
            Arg::with_name(arg::DUMP_CONFIG)
                .help("Dump config instead of performing")
                .long("--dump-config"),
        )
        .arg(
            Arg::with_name(arg::SCORE)
                .help("The score (.toml) to perform")
                .required_unless_one(&[arg::DUMP_CONFIG])
                .index(1),
        )
}

fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metronome=warn".into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(matches: clap::ArgMatches) -> anyhow::Result<()> {
    use config::clap::Clappable;

    let base = match matches.value_of(arg::CONFIG) {
        Some(path) => config::Config::load(path)?,
        None => config::Config::default(),
    };
    let config = base.parse_clap(&matches)?;
    if matches.is_present(arg::DUMP_CONFIG) {
        dump_config(&config)
    } else {
        let input = matches
            .value_of(arg::SCORE)
            .ok_or_else(|| anyhow::anyhow!("no score given"))?;
        run_score(&config, input)
    }
}

fn dump_config(config: &config::Config) -> anyhow::Result<()> {
    println!("{}", config.to_string()?);
    Ok(())
}

fn run_score(config: &config::Config, input: &str) -> anyhow::Result<()> {
    let mut score = Score::load(input)?;
    score.reorder(&mut *config.order.to_interleaver(config.seed));

    let last = setup_ctrlc()?;
    let performance = score::perform(&score, &config.thread, |frame| {
        *last.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame.checkpoint.to_string());
    })?;

    config.output.to_outputter(io::stdout()).output(performance)?;
    Ok(())
}

/// Installs a control-C handler that reports how far a stuck performance got.
///
/// The engine never times out a player that doesn't reach its checkpoint, so
/// this is the way out of a stalled run.
fn setup_ctrlc() -> anyhow::Result<Arc<Mutex<Option<String>>>> {
    let last = Arc::new(Mutex::new(None::<String>));
    let seen = last.clone();
    ctrlc::set_handler(move || {
        let seen = seen.lock().unwrap_or_else(PoisonError::into_inner);
        match &*seen {
            Some(cp) => eprintln!("interrupted; last checkpoint reached was {}", cp),
            None => eprintln!("interrupted before any checkpoint was reached"),
        }
        std::process::exit(130)
    })?;
    Ok(last)
}
