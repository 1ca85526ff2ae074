use clap::Parser;
use log::{error, info};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    time::Duration,
};
use vertex_cover_sat::{sat::Varisat, Error, Orchestrator, RoundConfig, Session};

/// Reads `V <n>` / `E {<u,v>,...}` lines and prints two exact and four
/// approximate vertex covers for every edge list.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Input file, standard input when omitted.
    input: Option<PathBuf>,

    /// CPU seconds each SAT based search may use before it reports a timeout.
    #[arg(long, value_name = "SECONDS", default_value = "5", value_parser = parse_seconds)]
    timeout: Duration,

    /// How often the deadline watchers sample the search threads.
    #[arg(long, value_name = "MS", default_value_t = 10)]
    poll_ms: u64,
}

impl Cli {
    fn config(&self) -> RoundConfig {
        RoundConfig {
            cpu_limit: self.timeout,
            poll_interval: Duration::from_millis(self.poll_ms),
        }
    }
}

fn parse_seconds(arg: &str) -> Result<Duration, String> {
    let seconds: f64 = arg.parse().map_err(|err| format!("{err}"))?;
    Duration::try_from_secs_f64(seconds).map_err(|err| format!("{err}"))
}

type Rounds = Orchestrator<fn() -> Varisat>;

fn run(reader: impl BufRead, orchestrator: &Rounds) -> Result<(), Error> {
    let mut session = Session::new();
    let stdout = io::stdout();
    for line in reader.lines() {
        let line = line?;
        let graph = match session.feed(&line) {
            Ok(Some(graph)) => graph,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("Error: {err}");
                continue;
            }
        };
        let result = orchestrator.run(&graph)?;
        let mut out = stdout.lock();
        write!(out, "{result}")?;
        out.flush()?;
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    info!("args = {:?}", cli);

    let orchestrator: Rounds = Orchestrator::new(cli.config(), Varisat::new);
    let result = match &cli.input {
        Some(path) => run(BufReader::new(File::open(path)?), &orchestrator),
        None => run(io::stdin().lock(), &orchestrator),
    };
    if let Err(err) = &result {
        error!("{err}");
    }
    result
}
