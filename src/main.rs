use clap::Parser;
use lift_power::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::bootstrap();

    match cli.command {
        Command::Plan(args) => cli::plan::run(args, &config).await,
        Command::Curve(args) => cli::curve::run(args, &config),
        Command::Significance(args) => cli::point::run_significance(args, &config),
        Command::Power(args) => cli::point::run_power(args, &config),
        Command::Evaluate(args) => cli::point::run_evaluate(args, &config),
    }
}
