use std::io;

use chrono::Local;
use clap::Parser;

use tax_cli::cli::Cli;
use tax_cli::{commands, logging};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let today = Local::now().date_naive();
    let mut stdout = io::stdout().lock();
    commands::run(&cli, today, &mut stdout)
}
