use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use driverlog_core::ReceiptRecord;

/// Fixed column order of the persistent log.
pub const LOG_HEADERS: [&str; 6] =
    ["Driver ID", "Driver Name", "Amount", "Date", "Receipt Type", "Timestamp"];

/// How often a blocked writer re-checks the lock.
const LOCK_POLL: Duration = Duration::from_millis(25);

#[derive(Debug, Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Another writer holds the log lock: {}", .0.display())]
    ConcurrentWrite(PathBuf),
}

/// Append-only CSV log of processed receipts.
///
/// Writes follow an acquire/append/release contract: a sidecar lock file is
/// created atomically before touching the log and removed afterwards, and a
/// writer that cannot obtain the lock within `lock_wait` fails with
/// `ConcurrentWrite` without writing anything.
pub struct ReceiptLog {
    path: PathBuf,
    lock_wait: Duration,
}

impl ReceiptLog {
    pub fn new(path: impl Into<PathBuf>, lock_wait: Duration) -> Self {
        Self { path: path.into(), lock_wait }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log with its header row if it does not exist yet, so the
    /// history display has a well-formed file before the first append.
    pub fn ensure_exists(&self) -> Result<(), LogError> {
        if self.path.exists() {
            return Ok(());
        }
        self.create_parent_dirs()?;
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(LOG_HEADERS)?;
        writer.flush()?;
        Ok(())
    }

    /// Append one record, writing the header row first when the log is new.
    pub fn append(&self, record: &ReceiptRecord) -> Result<(), LogError> {
        self.create_parent_dirs()?;
        let _lock = LogLock::acquire(&self.lock_path(), self.lock_wait)?;

        let write_headers = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_headers)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        tracing::debug!(log = %self.path.display(), driver = %record.driver_id, "appended log row");
        Ok(())
    }

    /// Read the whole log back. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<ReceiptRecord>, LogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            rows.push(result?);
        }
        Ok(rows)
    }

    /// The most recent `n` records, oldest first.
    pub fn tail(&self, n: usize) -> Result<Vec<ReceiptRecord>, LogError> {
        let mut rows = self.read_all()?;
        let start = rows.len().saturating_sub(n);
        Ok(rows.split_off(start))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn create_parent_dirs(&self) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Held for the duration of one append; the sidecar file is removed on drop
/// even when the append itself fails.
struct LogLock {
    path: PathBuf,
}

impl LogLock {
    fn acquire(path: &Path, wait: Duration) -> Result<Self, LogError> {
        let deadline = Instant::now() + wait;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(_) => return Ok(Self { path: path.to_path_buf() }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(LogError::ConcurrentWrite(path.to_path_buf()));
                    }
                    std::thread::sleep(LOCK_POLL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for LogLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use driverlog_core::ReceiptType;

    fn record(driver_id: &str) -> ReceiptRecord {
        ReceiptRecord::new(
            driver_id,
            "John Doe",
            "N4,000",
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            ReceiptType::DrReceipt,
            chrono::Local.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
        )
    }

    fn test_log(dir: &tempfile::TempDir) -> ReceiptLog {
        ReceiptLog::new(dir.path().join("dataset.csv"), Duration::from_millis(200))
    }

    #[test]
    fn first_append_writes_the_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(&dir);
        log.append(&record("A12")).unwrap();

        let raw = fs::read_to_string(log.path()).unwrap();
        let mut lines = raw.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Driver ID,Driver Name,Amount,Date,Receipt Type,Timestamp"
        );
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn headers_are_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(&dir);
        for i in 0..3 {
            log.append(&record(&format!("A{i}"))).unwrap();
        }
        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 4);
        assert_eq!(raw.lines().filter(|l| l.starts_with("Driver ID")).count(), 1);
    }

    #[test]
    fn appended_records_read_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(&dir);
        let records: Vec<_> = (0..5).map(|i| record(&format!("D{i}"))).collect();
        for r in &records {
            log.append(r).unwrap();
        }
        assert_eq!(log.read_all().unwrap(), records);
    }

    #[test]
    fn comma_in_amount_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(&dir);
        let r = record("A12");
        assert_eq!(r.amount, "N4,000");
        log.append(&r).unwrap();
        assert_eq!(log.read_all().unwrap()[0].amount, "N4,000");
    }

    #[test]
    fn ensure_exists_creates_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(&dir);
        log.ensure_exists().unwrap();

        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 1);

        // A later append must not duplicate the headers.
        log.append(&record("A12")).unwrap();
        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn missing_log_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(test_log(&dir).read_all().unwrap().is_empty());
    }

    #[test]
    fn tail_returns_the_most_recent_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(&dir);
        for i in 0..12 {
            log.append(&record(&format!("D{i:02}"))).unwrap();
        }
        let tail = log.tail(10).unwrap();
        assert_eq!(tail.len(), 10);
        assert_eq!(tail.first().unwrap().driver_id, "D02");
        assert_eq!(tail.last().unwrap().driver_id, "D11");
    }

    #[test]
    fn held_lock_fails_the_append_within_the_bound() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReceiptLog::new(dir.path().join("dataset.csv"), Duration::from_millis(80));

        let lock_path = dir.path().join("dataset.csv.lock");
        fs::write(&lock_path, b"").unwrap();

        let err = log.append(&record("A12")).unwrap_err();
        assert!(matches!(err, LogError::ConcurrentWrite(_)));
        // Nothing was written.
        assert!(!log.path().exists());

        // Releasing the lock lets the next append through.
        fs::remove_file(&lock_path).unwrap();
        log.append(&record("A12")).unwrap();
        assert_eq!(log.read_all().unwrap().len(), 1);
    }

    #[test]
    fn lock_is_released_after_append() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(&dir);
        log.append(&record("A12")).unwrap();
        assert!(!dir.path().join("dataset.csv.lock").exists());
    }
}
