mod cmd;

use clap::Parser;
use cmd::Cli;

fn main() {
    let cli = Cli::parse();
    cmd::init_logging(cli.verbose);

    if let Err(e) = cmd::run(cli) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
