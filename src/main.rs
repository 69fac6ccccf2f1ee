use clap::Parser;
use tracing_subscriber::EnvFilter;

use biowdl_input_converter::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Documents may go to stdout, so logs always go to stderr
    let filter = if cli.verbose {
        EnvFilter::new("biowdl_input_converter=debug,info")
    } else {
        EnvFilter::new("biowdl_input_converter=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    cli::convert::run(&cli.convert)
}
