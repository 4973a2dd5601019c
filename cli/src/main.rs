mod commands;
mod terminal;

use commands::{CommandLine, Commands, lookup, service, trace};
use mncreach_common::warn;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg = commands.config();

    logging::init_logging(&cfg)?;
    print::banner(cfg.quiet);

    if commands.command.traces() && !is_root::is_root() {
        warn!("Not running as root, mtr may be unable to send its probes");
    }

    match commands.command {
        Commands::Alternate { .. } => trace::alternate(&cfg).await,
        Commands::LastHop { .. } => trace::last_hop(&cfg).await,
        Commands::Addresses => lookup::addresses(&cfg).await,
        Commands::Asn => lookup::asn(&cfg).await,
        Commands::Vowifi { .. } => service::vowifi(&cfg).await,
        Commands::Rcs { .. } => service::rcs(&cfg).await,
    }
}
