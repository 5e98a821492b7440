use myquery::{cli, core::db::database};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let invocation = match cli::parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", cli::USAGE);
            process::exit(2);
        }
    };

    let config = match cli::load_config(&invocation) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    // Initialize the logging system; RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting myquery...");

    let stdout = std::io::stdout();
    let outcome = cli::run(&invocation, &config, &mut stdout.lock());
    database::close();

    if let Err(e) = outcome {
        eprintln!("{}", e);
        process::exit(1);
    }
}
