pub mod lookup;
pub mod run;
pub mod service;
pub mod trace;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use mncreach_common::config::{Config, DEFAULT_INPUT, DEFAULT_OUTPUT, ProbeSettings};

const DEFAULTS: ProbeSettings = ProbeSettings::DEFAULT;

#[derive(Parser)]
#[command(name = "mncreach")]
#[command(about = "Enriches an MCC/MNC listing with network reachability data.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Semicolon separated listing to read
    #[arg(short, long, global = true, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Where the enriched listing is written
    #[arg(short, long, global = true, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Less output: -q prints the summary only, -qq errors only
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Seconds allowed for all work on one row
    #[arg(long, global = true, value_name = "SECS", default_value_t = DEFAULTS.row_timeout.as_secs())]
    pub row_timeout: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find a pingable hop inside the operator's AS for unreachable ePDGs (ip4, ip6)
    #[command(alias = "a")]
    Alternate {
        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// Record the last hop that answered a trace, any AS (alternative_ip)
    #[command(alias = "l")]
    LastHop {
        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// Resolve reachable service domains (ip4, ip6)
    #[command(alias = "ip")]
    Addresses,
    /// Look up the origin AS of the service domains (as_num_*, as_name_*)
    Asn,
    /// Check whether the ePDG domain resolves and answers (vowifi, pingable, domain)
    #[command(alias = "v")]
    Vowifi {
        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// Check whether the RCS config domain resolves and answers (rcs, rcs_pingable, rcs_domain)
    #[command(alias = "r")]
    Rcs {
        #[command(flatten)]
        probe: ProbeArgs,
    },
}

impl Commands {
    /// Subcommands that run `mtr`, which usually needs raw sockets.
    pub fn traces(&self) -> bool {
        matches!(self, Self::Alternate { .. } | Self::LastHop { .. })
    }
}

#[derive(Args, Clone, Copy)]
pub struct ProbeArgs {
    /// Echo requests per candidate address
    #[arg(long, default_value_t = DEFAULTS.attempts_per_candidate)]
    pub attempts: u32,

    /// Milliseconds to wait for one echo reply
    #[arg(long, value_name = "MS", default_value_t = DEFAULTS.probe_timeout.as_millis() as u64)]
    pub probe_timeout: u64,

    /// Maximum number of hops traced
    #[arg(long, default_value_t = DEFAULTS.max_hops)]
    pub max_hops: u8,

    /// Trace probes sent per hop
    #[arg(long, default_value_t = DEFAULTS.probes_per_hop)]
    pub cycles: u16,

    /// Seconds allowed for one trace
    #[arg(long, value_name = "SECS", default_value_t = DEFAULTS.trace_timeout.as_secs())]
    pub trace_timeout: u64,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let mut probe = match &self.command {
            Commands::Alternate { probe }
            | Commands::LastHop { probe }
            | Commands::Vowifi { probe }
            | Commands::Rcs { probe } => probe.settings(),
            Commands::Addresses | Commands::Asn => DEFAULTS,
        };
        probe.row_timeout = Duration::from_secs(self.row_timeout);

        Config {
            input: self.input.clone(),
            output: self.output.clone(),
            quiet: self.quiet,
            verbose: self.verbose,
            probe,
        }
    }
}

impl ProbeArgs {
    pub fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            attempts_per_candidate: self.attempts.max(1),
            probe_timeout: Duration::from_millis(self.probe_timeout),
            max_hops: self.max_hops,
            probes_per_hop: self.cycles,
            trace_timeout: Duration::from_secs(self.trace_timeout),
            row_timeout: DEFAULTS.row_timeout,
        }
    }
}
