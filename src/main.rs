use anyhow::Context;
use clap::Parser;
use heightmill::cli::{self, Cli};
use heightmill::{init_logging, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = args.load_config()?;

    init_logging(config.verbose)?;
    tracing::debug!("heightmill {} ({})", VERSION, BUILD_DATE);

    let diagnostics = cli::run(&args, &config).context("Toolpath generation failed")?;
    eprintln!("{}", cli::report(&diagnostics, config.verbose));

    Ok(())
}
