//! # Logger
//!
//! Installs the process-wide `tracing` subscriber used by the server and the CLI:
//! a console layer (compact ANSI or JSON) and an optional rolling file layer written
//! through a non-blocking worker. `RUST_LOG` is honoured unless an explicit filter is
//! supplied with [`LoggerBuilder::env_filter`].
//!
//! ```rust
//! use brite_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("brite-doc")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
struct LoggerSettings {
    console: bool,
    console_json: bool,
    level: LevelFilter,
    env_filter: Option<String>,
    directory: Option<PathBuf>,
    rotation: Rotation,
    max_files: usize,
    file_json: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            console: true,
            console_json: false,
            level: LevelFilter::INFO,
            env_filter: None,
            directory: None,
            rotation: Rotation::DAILY,
            max_files: 10,
            file_json: false,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Builder for the global subscriber. A name is mandatory; file options only become
/// available after [`LoggerBuilder::directory`].
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    settings: LoggerSettings,
    name: N,
    file: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Names the logger; the name prefixes rolling files (`brite-server.2025-05-02.log`).
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { settings: self.settings, name: WithName(name.into()), file: PhantomData }
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    #[must_use = "the builder does nothing until .init() is called"]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Programmatic filter directives such as `brite_relay=debug,hyper=info`.
    ///
    /// Replaces `RUST_LOG`; an invalid directive makes [`LoggerBuilder::init`] fail.
    #[must_use = "the builder does nothing until .init() is called"]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.settings.env_filter = Some(filter.into()).filter(|f: &String| !f.trim().is_empty());
        self
    }

    #[must_use = "the builder does nothing until .init() is called"]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Emits console records as JSON lines (container deployments).
    #[must_use = "the builder does nothing until .init() is called"]
    pub const fn console_json(mut self, enabled: bool) -> Self {
        self.settings.console_json = enabled;
        self
    }

    /// Enables the rolling file layer in `directory` (created when missing).
    pub fn directory(self, directory: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut settings = self.settings;
        settings.directory = Some(directory.into());
        LoggerBuilder { settings, name: self.name, file: PhantomData }
    }

    /// Installs the subscriber.
    ///
    /// The returned [`Logger`] owns the file writer guard and must outlive the program's
    /// logging, otherwise buffered records are lost.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, `max_files == 0`,
    ///   a bad filter, or when no layer is enabled.
    /// * [`LoggerError::Io`] / [`LoggerError::Appender`] if the log directory is unusable.
    /// * [`LoggerError::Subscriber`] if a global subscriber already exists.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: WithName(name), .. } = self;
        validate(&settings, &name)?;

        let filter = env_filter(&settings)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if settings.console {
            let console = layer().with_target(true);
            layers.push(if settings.console_json {
                console.json().boxed()
            } else {
                console.compact().with_ansi(true).boxed()
            });
        }

        let guard = match &settings.directory {
            Some(directory) => {
                std::fs::create_dir_all(directory)
                    .context(format!("Failed to create log directory {}", directory.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(settings.rotation.clone())
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(settings.max_files)
                    .build(directory)
                    .context(format!("Failed to open log files in {}", directory.display()))?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if settings.file_json {
                    file_layer.json().boxed()
                } else {
                    file_layer.boxed()
                });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "no output enabled; turn on the console or configure a directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;
        tracing::debug!(logger = %name, "Logging initialized");

        Ok(Logger { guard })
    }
}

impl LoggerBuilder<WithName, WithFile> {
    #[must_use = "the builder does nothing until .init() is called"]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use = "the builder does nothing until .init() is called"]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Writes file records as JSON lines.
    #[must_use = "the builder does nothing until .init() is called"]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.settings.file_json = enabled;
        self
    }
}

/// Handle to the installed logging system; dropping it flushes and stops the file writer.
#[must_use = "dropping this handle stops background log writing"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: LoggerSettings::default(), name: NoName, file: PhantomData }
    }

    /// Whether a file writer is attached.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing log files");
        }
    }
}

/// Parses a textual level (`"info"`, `"DEBUG"`, `"off"`) from configuration.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for unknown level names.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    level.trim().parse::<LevelFilter>().map_err(|_| LoggerError::InvalidConfiguration {
        message: format!("unknown log level '{level}'").into(),
        context: None,
    })
}

fn validate(settings: &LoggerSettings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "logger name cannot be empty".into(),
            context: None,
        });
    }
    if settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(settings: &LoggerSettings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    match &settings.env_filter {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => {
            builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("invalid filter '{directives}': {e}").into(),
                context: None,
            })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder().name("brite-test");
        assert!(builder.settings.console);
        assert!(!builder.settings.console_json);
        assert_eq!(builder.settings.level, LevelFilter::INFO);
        assert!(builder.settings.directory.is_none());
    }

    #[test]
    fn file_options_are_recorded() {
        let tmp = tempdir().expect("tempdir");
        let builder = Logger::builder()
            .name("brite-test")
            .env_filter("brite_relay=debug")
            .directory(tmp.path())
            .max_files(3)
            .json(true)
            .level(LevelFilter::WARN);

        assert_eq!(builder.settings.max_files, 3);
        assert!(builder.settings.file_json);
        assert_eq!(builder.settings.level, LevelFilter::WARN);
        assert_eq!(builder.settings.env_filter.as_deref(), Some("brite_relay=debug"));
        assert_eq!(builder.settings.directory.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn blank_filter_is_ignored() {
        let builder = Logger::builder().name("brite-test").env_filter("  ");
        assert!(builder.settings.env_filter.is_none());
    }

    #[test]
    #[serial]
    fn rejects_empty_name() {
        let err = Logger::builder().name(" ").init().expect_err("empty name must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn rejects_invalid_filter() {
        let err = Logger::builder()
            .name("brite-test")
            .env_filter("brite_relay=notalevel")
            .init()
            .expect_err("bad filter must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn rejects_no_outputs() {
        let err = Logger::builder()
            .name("brite-test")
            .console(false)
            .init()
            .expect_err("no layer must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn parses_levels() {
        assert_eq!(parse_level("debug").expect("debug"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" WARN ").expect("warn"), LevelFilter::WARN);
        assert_eq!(parse_level("off").expect("off"), LevelFilter::OFF);
        assert!(parse_level("loud").is_err());
    }
}
