use clap::Parser;
use colored::Colorize;

pub mod cli;
pub mod research;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = cli::Cli::parse();
    cli::run(args).await.map_err(|e| {
        println!("{} {}", "❌".red(), e);
        e.into()
    })
}
