//! # Row Enrichment
//!
//! Every subcommand is a [`RowEnricher`]: it declares which columns it needs
//! and which it fills, and is handed rows one at a time by the streaming
//! pipeline in this module.
//!
//! The pipeline:
//! 1. opens the input and reads the header,
//! 2. checks the required columns before anything is written,
//! 3. writes the header extended with the enricher's columns,
//! 4. enriches each record under a per-row timeout and flushes it right away.
//!
//! [`enrich_file`] streams into a temporary file next to the output and only
//! moves it into place once every record has been read, so a run that stops
//! early leaves an earlier result untouched.
//!
//! A row that times out is written with whatever the enricher managed to set
//! before the deadline.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use csv::StringRecord;
use mncreach_common::{debug, error::EnrichError, warn};
use tempfile::NamedTempFile;

use crate::table::{self, Header, Row};

pub mod addresses;
pub mod alternate;
pub mod asn;
pub mod last_hop;
pub mod service;

pub use addresses::AddressEnricher;
pub use alternate::AlternateEnricher;
pub use asn::AsnEnricher;
pub use last_hop::LastHopEnricher;
pub use service::ServiceEnricher;

/// Column names of the operator listing.
pub mod column {
    pub const MCC: &str = "MCC";
    pub const MNC: &str = "MNC";
    pub const VOWIFI: &str = "vowifi";
    pub const PINGABLE: &str = "pingable";
    pub const DOMAIN: &str = "domain";
    pub const RCS: &str = "rcs";
    pub const RCS_PINGABLE: &str = "rcs_pingable";
    pub const RCS_DOMAIN: &str = "rcs_domain";
    pub const AS_NUM_DOMAIN: &str = "as_num_domain";
    pub const AS_NAME_DOMAIN: &str = "as_name_domain";
    pub const AS_NUM_RCS: &str = "as_num_rcs";
    pub const AS_NAME_RCS: &str = "as_name_rcs";
    pub const IP4: &str = "ip4";
    pub const IP6: &str = "ip6";
    pub const ALTERNATIVE_IP: &str = "alternative_ip";
}

/// What happened to a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row does not qualify for this enricher.
    Skipped,
    /// Every output column was already populated.
    AlreadyDone,
    /// At least one column was filled.
    Enriched,
    /// The row qualified but nothing was found.
    NotFound,
    /// The per-row deadline expired.
    TimedOut,
}

/// Running counts over a whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub rows: usize,
    pub skipped: usize,
    pub already_done: usize,
    pub enriched: usize,
    pub not_found: usize,
    pub timed_out: usize,
}

impl EnrichSummary {
    pub fn record(&mut self, outcome: RowOutcome) {
        self.rows += 1;
        match outcome {
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::AlreadyDone => self.already_done += 1,
            RowOutcome::Enriched => self.enriched += 1,
            RowOutcome::NotFound => self.not_found += 1,
            RowOutcome::TimedOut => self.timed_out += 1,
        }
    }
}

#[async_trait]
pub trait RowEnricher: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Columns that must be present in the input header.
    fn required_columns(&self) -> &'static [&'static str];

    /// Columns this enricher fills. Missing ones are appended to the header.
    fn output_columns(&self) -> &'static [&'static str];

    /// Fills the output columns of `row`. Never overwrites a populated column.
    async fn enrich(&self, row: &mut Row<'_>) -> RowOutcome;
}

/// Called after every written row with the counts so far.
pub type OnRow = Box<dyn Fn(&EnrichSummary) + Send + Sync>;

/// Enriches `input` into `output`.
///
/// A missing input is reported as [`EnrichError::InputFileMissing`]. The
/// output is replaced only when the whole input went through; on any error
/// an earlier result at `output` is left as it was.
pub async fn enrich_file(
    input: &Path,
    output: &Path,
    enricher: &dyn RowEnricher,
    row_timeout: Duration,
    on_row: Option<OnRow>,
) -> Result<EnrichSummary, EnrichError> {
    if same_file(input, output) {
        return Err(EnrichError::Output(format!(
            "refusing to overwrite the input file {}",
            input.display()
        )));
    }

    let file = File::open(input).map_err(|e| match e.kind() {
        ErrorKind::NotFound => EnrichError::InputFileMissing(input.to_path_buf()),
        _ => EnrichError::Io(e),
    })?;

    let mut reader = table::reader(file);
    let header = prepare_header(&mut reader, enricher)?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)
        .map_err(|e| EnrichError::Output(format!("{}: {e}", dir.display())))?;

    let summary = {
        let mut writer = table::writer(staged.as_file_mut());
        process(&mut reader, &header, &mut writer, enricher, row_timeout, on_row).await?
    };

    staged
        .persist(output)
        .map_err(|e| EnrichError::Output(format!("{}: {}", output.display(), e.error)))?;
    Ok(summary)
}

/// Same as [`enrich_file`] over arbitrary streams. Nothing is written when the
/// header is unusable.
pub async fn enrich_stream<R: Read, W: Write>(
    input: R,
    output: W,
    enricher: &dyn RowEnricher,
    row_timeout: Duration,
    on_row: Option<OnRow>,
) -> Result<EnrichSummary, EnrichError> {
    let mut reader = table::reader(input);
    let header = prepare_header(&mut reader, enricher)?;
    let mut writer = table::writer(output);

    process(&mut reader, &header, &mut writer, enricher, row_timeout, on_row).await
}

fn prepare_header<R: Read>(
    reader: &mut csv::Reader<R>,
    enricher: &dyn RowEnricher,
) -> Result<Header, EnrichError> {
    let header = table::read_header(reader)?;
    if let Some(missing) = enricher
        .required_columns()
        .iter()
        .find(|name| !header.contains(name))
    {
        return Err(EnrichError::MissingColumn(missing.to_string()));
    }
    Ok(header.with_columns(enricher.output_columns()))
}

async fn process<R: Read, W: Write>(
    reader: &mut csv::Reader<R>,
    header: &Header,
    writer: &mut csv::Writer<W>,
    enricher: &dyn RowEnricher,
    row_timeout: Duration,
    on_row: Option<OnRow>,
) -> Result<EnrichSummary, EnrichError> {
    table::write_flushed(writer, header.columns())?;

    let mut summary = EnrichSummary::default();
    let mut record = StringRecord::new();

    while reader.read_record(&mut record).map_err(table::malformed)? {
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let mut row = Row::from_fields(header, record.iter(), line);

        let outcome = match tokio::time::timeout(row_timeout, enricher.enrich(&mut row)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    "{}: line {line} took longer than {}s, writing what was found",
                    enricher.name(),
                    row_timeout.as_secs()
                );
                RowOutcome::TimedOut
            }
        };
        debug!("{}: line {line} -> {outcome:?}", enricher.name());

        table::write_flushed(writer, row.values())?;
        summary.record(outcome);
        if let Some(callback) = &on_row {
            callback(&summary);
        }
    }

    Ok(summary)
}

fn same_file(input: &Path, output: &Path) -> bool {
    match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    }
}

/// AS numbers compare equal when both are present and match without their
/// `AS` prefix.
pub(crate) fn same_as(a: &str, b: &str) -> bool {
    let a = mncreach_common::network::asn::strip_as_prefix(a);
    let b = mncreach_common::network::asn::strip_as_prefix(b);
    !a.is_empty() && a == b
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
