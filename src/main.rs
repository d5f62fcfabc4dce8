//! Entry point for `udpnat`.
//!
//! Parses CLI flags into an explicit [`Config`] and dispatches into the
//! library's single entry function. All protocol work lives in the library;
//! this file owns only process setup (logging, argument parsing, exit
//! status).

use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use udpnat::{Announce, Config, Role};

/// Probe how long a NAT keeps a UDP binding alive.
///
/// Without --host, listens as a rendezvous server on the given port.
/// With --host, connects to a server and runs the announced role.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Remote server host; presence selects client mode.
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// UDP port to listen on (server) or connect to (client).
    #[arg(short, long)]
    port: u16,

    /// Role to announce in client mode.
    #[arg(long, value_enum, default_value_t = AnnounceArg::Slave)]
    announce: AnnounceArg,

    /// Fail a master session on a malformed reply instead of logging it.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnnounceArg {
    Slave,
    Master,
}

fn main() -> ExitCode {
    // Set RUST_LOG to control verbosity; defaults to info for this crate's
    // measurement output.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let role = match cli.host {
        Some(host) => Role::Client {
            host,
            port: cli.port,
        },
        None => Role::Server { port: cli.port },
    };
    let mut config = Config::new(role);
    config.strict = cli.strict;
    config.announce = match cli.announce {
        AnnounceArg::Slave => Announce::Slave,
        AnnounceArg::Master => Announce::Master,
    };

    match udpnat::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
