//! CSV audit report for created leads.
//!
//! One file per run under
//! `<report_dir>/LeadCreationReports/<environment>/<dd-MM-yyyy>/`. Each
//! [`LeadRecord`] is written as one row and flushed immediately; at the end
//! of the run the file is renamed to carry the final count and time.

use chrono::{Local, NaiveDateTime};
use leadforge_application::{AuditError, AuditLog, BatchSummary};
use leadforge_domain::{CustomerType, Environment, LeadRecord, epoch};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

const HEADER: &str =
    "S.no,customerType,customer_Id,projectID,designerName,designerEmail,designerMobile";

/// Append-only CSV report.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every row.
pub struct CsvAuditReport {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    customer_type: CustomerType,
}

impl CsvAuditReport {
    /// Open (or continue) the report for a run.
    ///
    /// `last_processed` is the resume cursor at run start, so reports of
    /// successive runs on one day do not collide.
    pub fn create(
        report_dir: &Path,
        environment: Environment,
        run_date: chrono::NaiveDate,
        customer_type: CustomerType,
        last_processed: u32,
    ) -> Result<Self, AuditError> {
        let dir = report_dir
            .join("LeadCreationReports")
            .join(environment.as_str())
            .join(epoch::format_run_date(run_date));
        std::fs::create_dir_all(&dir).map_err(|e| {
            AuditError::Write(format!("could not create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(format!(
            "{}-Leads_LastAt_{}.csv",
            customer_type, last_processed
        ));
        Self::open(path, customer_type)
    }

    /// Open a report at an explicit path, writing the header if it is new
    pub fn open(path: impl AsRef<Path>, customer_type: CustomerType) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AuditError::Write(format!("{}: {}", path.display(), e)))?;

        let is_new = file.metadata().map(|m| m.len() == 0).unwrap_or(true);
        if is_new {
            writeln!(file, "{HEADER}")
                .map_err(|e| AuditError::Write(format!("{}: {}", path.display(), e)))?;
        }

        debug!(path = %path.display(), "Audit report opened");
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            customer_type,
        })
    }

    /// Get the path of the (unfinalized) report.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn final_name(&self, summary: &BatchSummary, finished_at: NaiveDateTime) -> String {
        format!(
            "{}_{}-Leads_LastAt_{}_{}.csv",
            summary.created(),
            self.customer_type,
            summary.last_successful_ordinal,
            finished_at.format("%I.%M.%p")
        )
    }
}

impl AuditLog for CsvAuditReport {
    fn append(&self, record: &LeadRecord) -> Result<(), AuditError> {
        let line = csv_row(&[
            &record.ordinal.to_string(),
            record.customer_type.as_str(),
            &record.customer_id,
            &record.project_id,
            &record.dp_name,
            &record.dp_email,
            &record.dp_mobile,
        ]);

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| AuditError::Write("report writer poisoned".to_string()))?;
        writeln!(writer, "{line}")
            .and_then(|_| writer.flush())
            .and_then(|_| writer.get_ref().sync_data())
            .map_err(|e| AuditError::Write(format!("{}: {}", self.path.display(), e)))
    }

    fn finalize(&self, summary: &BatchSummary) -> Result<PathBuf, AuditError> {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }

        let final_path = self
            .path
            .with_file_name(self.final_name(summary, Local::now().naive_local()));
        std::fs::rename(&self.path, &final_path).map_err(|e| {
            warn!(
                "Could not rename {} to {}: {}",
                self.path.display(),
                final_path.display(),
                e
            );
            AuditError::Finalize(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(final_path)
    }
}

impl Drop for CsvAuditReport {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

/// Join fields, quoting those that contain separators or quotes
fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| {
            if f.contains([',', '"', '\n', '\r']) {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                f.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
