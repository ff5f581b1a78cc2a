use crate::demo::{
    run_approval_check, run_demo, run_status_check, ApprovalArgs, DemoArgs, StatusArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use route_compliance::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Route Compliance",
    about = "Track staff licence compliance and approve delivery routes",
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
    /// Classify a licence expiry date
    Status(StatusArgs),
    /// Check whether a route could be approved
    Approval(ApprovalArgs),
    /// Seed an in-memory depot and print the staff and route boards
    Demo(DemoArgs),
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
        Command::Status(args) => run_status_check(args),
        Command::Approval(args) => run_approval_check(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["route-compliance"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_approval_flags() {
        let cli = Cli::try_parse_from([
            "route-compliance",
            "approval",
            "--minutes",
            "50",
            "--staff-status",
            "expiring-soon",
            "--admin",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Approval(args)) => {
                assert_eq!(args.minutes, 50);
                assert!(args.admin);
            }
            other => panic!("expected approval command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_as_of_date() {
        let result = Cli::try_parse_from([
            "route-compliance",
            "status",
            "--license-expiry",
            "2024-06-01",
            "--as-of",
            "June first",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_negative_warning_window() {
        let result = Cli::try_parse_from([
            "route-compliance",
            "status",
            "--license-expiry",
            "2024-06-01",
            "--warning-days=-3",
        ]);
        assert!(result.is_err());
    }
}
