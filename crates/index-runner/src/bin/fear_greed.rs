use std::process::ExitCode;

use clap::Parser;
use index_runner::{app, FearGreed, RunArgs};

#[derive(Parser)]
#[command(name = "fear-greed", version, about = "Score the crypto Fear & Greed Index")]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    app::init_tracing();

    let cli = Cli::parse();
    app::exit_code(app::run_index(&FearGreed, cli.run).await)
}
