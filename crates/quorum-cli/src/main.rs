//! Quorum config tool
//!
//! Usage:
//!   quorum check <config.json>
//!   quorum hash <config.json>
//!   quorum diff <current.json> <new.json> [timestamp]
//!   quorum approve <current.json> <envelope.json>

use quorum_cli::{CliConfig, CliError, Command};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn print_usage() {
    eprintln!("Quorum Config Tool");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  quorum check <config.json>                     Validate a config");
    eprintln!("  quorum hash <config.json>                      Print the config hash");
    eprintln!("  quorum diff <current.json> <new.json> [ts]     Derive contract updates");
    eprintln!("  quorum approve <current.json> <envelope.json>  Check envelope signatures");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUORUM_LOG     Tracing filter (default: quorum_cli=info,...)");
    eprintln!("  QUORUM_PRETTY  Pretty-print JSON output when 1 or true");
}

fn main() {
    let cli = CliConfig::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&cli.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if matches!(args.first().map(String::as_str), Some("-h" | "--help" | "help")) {
        print_usage();
        return;
    }

    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    match command.execute(&cli) {
        Ok(outcome) => {
            println!("{}", outcome.output);
            if !outcome.success {
                std::process::exit(1);
            }
        }
        Err(CliError::Usage(message)) => {
            eprintln!("Error: {}", message);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
