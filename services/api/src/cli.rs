use crate::report::{run_report, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use licensing_report::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Licensing Report Service",
    about = "Build radio licensing application reports over HTTP or from the command line",
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
    /// Build a report from a JSON export of application records
    Report(ReportArgs),
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
        Command::Report(args) => run_report(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["licensing-report-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_report_arguments() {
        let cli = Cli::try_parse_from([
            "licensing-report-api",
            "report",
            "--input",
            "applications.json",
            "--period-start",
            "2026-01-01",
            "--period-end",
            "2026-06-30",
            "--json",
        ])
        .expect("parses");

        let Some(Command::Report(args)) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.input.to_string_lossy(), "applications.json");
        assert_eq!(args.period_start.map(|d| d.to_string()).as_deref(), Some("2026-01-01"));
        assert!(args.json);
        assert_eq!(args.top, 10);
    }

    #[test]
    fn rejects_malformed_dates() {
        let parsed = Cli::try_parse_from([
            "licensing-report-api",
            "report",
            "--input",
            "applications.json",
            "--today",
            "19/10/2026",
        ]);
        assert!(parsed.is_err());
    }
}
