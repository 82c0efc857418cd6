use clap::Parser;
use tracing_subscriber::EnvFilter;
use utf8scan::{run, Args};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log)?)
        .with_writer(std::io::stderr)
        .init();
    run(&args, &mut std::io::stdout().lock())?;
    Ok(())
}
