use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT: &str = "mcc-mnc.csv";
pub const DEFAULT_OUTPUT: &str = "mcc-mnc_updated.csv";

pub struct Config {
    /// Semicolon separated listing to read.
    pub input: PathBuf,
    /// Where the enriched copy is written. Rows are flushed one by one.
    pub output: PathBuf,
    /// 0 = normal output, 1 = summary only, 2 = errors only.
    pub quiet: u8,
    pub verbose: bool,
    pub probe: ProbeSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            quiet: 0,
            verbose: false,
            probe: ProbeSettings::DEFAULT,
        }
    }
}

/// Knobs for the trace and echo probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Echo requests sent to a single candidate before moving on.
    pub attempts_per_candidate: u32,
    /// Time allowed for one echo reply.
    pub probe_timeout: Duration,
    /// Upper bound on hops the trace tool walks.
    pub max_hops: u8,
    /// Probes the trace tool sends per hop.
    pub probes_per_hop: u16,
    /// Wall time for one trace run, after which its output is discarded.
    pub trace_timeout: Duration,
    /// Wall time for all work on one row.
    pub row_timeout: Duration,
}

impl ProbeSettings {
    pub const DEFAULT: Self = Self {
        attempts_per_candidate: 3,
        probe_timeout: Duration::from_secs(2),
        max_hops: 30,
        probes_per_hop: 10,
        trace_timeout: Duration::from_secs(120),
        row_timeout: Duration::from_secs(300),
    };
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}
