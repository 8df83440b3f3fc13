use std::process::ExitCode;

use clap::Parser;
use index_runner::{app, AltcoinSeason, RunArgs};

#[derive(Parser)]
#[command(name = "altcoin-season", version, about = "Score the Altcoin Season Index")]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    app::init_tracing();

    let cli = Cli::parse();
    app::exit_code(app::run_index(&AltcoinSeason, cli.run).await)
}
