use crate::commands::{run_points_report, run_runs_list, PointsReportArgs, RunsListArgs};
use crate::server;
use agility_points::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Agility Points",
    about = "Score dog-agility runs and tally titling points from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Build a dog's titling points report
    Points {
        #[command(subcommand)]
        command: PointsCommand,
    },
    /// List a dog's runs with their scoring columns
    Runs {
        #[command(subcommand)]
        command: RunsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PointsCommand {
    /// Render the points report as text, HTML or CSV
    Report(PointsReportArgs),
}

#[derive(Subcommand, Debug)]
enum RunsCommand {
    /// Print the runs table, optionally sorted by one column
    List(RunsListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Points {
            command: PointsCommand::Report(args),
        } => run_points_report(args),
        Command::Runs {
            command: RunsCommand::List(args),
        } => run_runs_list(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["points-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_points_report_arguments() {
        let cli = Cli::try_parse_from([
            "points-api",
            "points",
            "report",
            "--document",
            "dogs.json",
            "--dog",
            "Pip",
            "--format",
            "csv",
            "--today",
            "2024-05-01",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Points {
                command: PointsCommand::Report(args),
            }) => {
                assert_eq!(args.dog, "Pip");
                assert_eq!(args.today.map(|d| d.to_string()).as_deref(), Some("2024-05-01"));
            }
            other => panic!("expected points report, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_sort_column() {
        let parsed = Cli::try_parse_from([
            "points-api",
            "runs",
            "list",
            "--document",
            "dogs.json",
            "--dog",
            "Pip",
            "--sort",
            "shoe_size",
        ]);
        assert!(parsed.is_err());
    }
}
