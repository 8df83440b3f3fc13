use std::process::ExitCode;

use clap::Parser;
use index_runner::{app, RunArgs};

#[derive(Parser)]
#[command(name = "news-monitor", version, about = "Send the newest unsent headline from each monitored site")]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    app::init_tracing();

    let cli = Cli::parse();
    app::exit_code(app::run_news_monitor(cli.run).await)
}
