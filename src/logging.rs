use chrono::{NaiveDate, Utc};
use env_logger::{Builder, Target, WriteStyle};
use log::{LevelFilter, Log, Metadata, Record};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::config::LOG_FILE_PREFIX;
use crate::error::Error;

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;
#[cfg(unix)]
const FILE_MODE: u32 = 0o640;

/// Name of the log file holding every record written on `date`.
#[must_use]
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{LOG_FILE_PREFIX}_{}.log", date.format("%Y-%m-%d"))
}

/// Append-only writer over one log file per calendar day.
///
/// Days are UTC dates, matching the record timestamps. The file for the
/// current date is opened on construction. When the date changes between two
/// writes, the next write lands in the new day's file; earlier files are never
/// reopened or truncated.
#[derive(Debug)]
pub struct DailyFile {
    dir: PathBuf,
    date: NaiveDate,
    file: Option<File>,
    closed: bool,
}

impl DailyFile {
    /// Creates `dir` (recursively) and opens today's file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogDir`] or [`Error::LogFile`] when the directory or
    /// the file cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<DailyFile, Error> {
        Self::open_on(dir.into(), Utc::now().date_naive())
    }

    fn open_on(dir: PathBuf, date: NaiveDate) -> Result<DailyFile, Error> {
        create_dir(&dir).map_err(|source| Error::LogDir {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(log_file_name(date));
        let file = open_append(&path).map_err(|source| Error::LogFile { path, source })?;

        Ok(DailyFile {
            dir,
            date,
            file: Some(file),
            closed: false,
        })
    }

    /// Path of the file currently written to.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(log_file_name(self.date))
    }

    /// Flushes and releases the file. Later writes are discarded.
    pub fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
        self.closed = true;
    }

    fn write_on(&mut self, today: NaiveDate, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Ok(buf.len());
        }

        if today != self.date || self.file.is_none() {
            // A missing directory (removed while running) is recreated.
            create_dir(&self.dir)?;
            let file = open_append(&self.dir.join(log_file_name(today)))?;
            self.file = Some(file);
            self.date = today;
        }

        match self.file.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }
}

impl Write for DailyFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_on(Utc::now().date_naive(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn create_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir)
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    options.open(path)
}

type SharedFile = Arc<Mutex<DailyFile>>;

fn lock(file: &SharedFile) -> MutexGuard<'_, DailyFile> {
    file.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle given to the file logger; the guard keeps the other one.
struct FileSink(SharedFile);

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        lock(&self.0).flush()
    }
}

/// Duplicates every record to the console and to the daily file.
struct Tee {
    console: env_logger::Logger,
    file: env_logger::Logger,
}

impl Log for Tee {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || self.file.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.console.log(record);
        self.file.log(record);
    }

    fn flush(&self) {
        self.console.flush();
        self.file.flush();
    }
}

fn builder(target: Target, style: WriteStyle) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .target(target)
        .write_style(style)
        .format_timestamp_secs();
    builder
}

/// Keeps the log file open for the lifetime of the process.
///
/// Dropping the guard flushes and closes the file.
pub struct LogGuard {
    file: SharedFile,
    path: PathBuf,
}

impl LogGuard {
    /// File that was opened at startup.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        log::logger().flush();
        lock(&self.file).close();
    }
}

/// Opens today's log file under `dir` and installs the global logger.
///
/// Records go to stdout (coloured when attached to a terminal) and, without
/// colours, to the daily file. The level is fixed at `info` and does not
/// follow `RUST_LOG`, so every check result is written.
///
/// # Errors
///
/// Fails when the directory or file cannot be created, or when a logger is
/// already installed.
pub fn init(dir: &Path) -> Result<LogGuard, Error> {
    let daily = DailyFile::open(dir)?;
    let path = daily.path();
    let file = Arc::new(Mutex::new(daily));

    let console = builder(Target::Stdout, WriteStyle::Auto).build();
    let file_logger = builder(
        Target::Pipe(Box::new(FileSink(Arc::clone(&file)))),
        WriteStyle::Never,
    )
    .build();

    let max_level = console.filter().max(file_logger.filter());
    log::set_boxed_logger(Box::new(Tee {
        console,
        file: file_logger,
    }))?;
    log::set_max_level(max_level);

    Ok(LogGuard { file, path })
}
