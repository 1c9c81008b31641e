//! Terminal entry point of the arcade hub.

use std::{io, process};

use arcade_app::cli::{self, Args};
use clap::Parser as _;

fn main() {
    better_panic::install();
    env_logger::init();

    let args = Args::parse();
    log::debug!("starting arcade hub: {args:?}");

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    if let Err(err) = cli::run(&args, stdin, stdout) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
