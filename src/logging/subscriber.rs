//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use super::utils::{
    BLUE, CYAN, DIM, GREEN, GREEN_BOLD, RED, WHITE, YELLOW, color_enabled, format_utc_datetime,
    format_utc_time, log_file_path, paint, strip_ansi,
};

pub(super) const SECTION: &str = "mint_setup::section";
pub(super) const SUBSECTION: &str = "mint_setup::subsection";
pub(super) const STEP: &str = "mint_setup::step";
pub(super) const SUCCESS: &str = "mint_setup::success";
pub(super) const DRY_RUN: &str = "mint_setup::dry_run";
pub(super) const SUMMARY: &str = "mint_setup::summary";

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends all events to the persistent
/// log file with timestamps and ANSI codes stripped.
///
/// Always captures events at `DEBUG` level and above regardless of the
/// console verbosity setting.
#[derive(Debug)]
pub(crate) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the log file for `command` under the cache directory.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?)
    }

    /// Truncate `path`, write a run header, and open it for appending.
    pub(crate) fn at(path: &Path) -> Option<Self> {
        let header = format!(
            "==========================================\n\
             mint-setup {} {}\n\
             ==========================================\n",
            crate::VERSION,
            format_utc_datetime(),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let level = *metadata.level();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = strip_ansi(&extractor.message);
        let ts = format_utc_time();

        let line = match (level, metadata.target()) {
            (tracing::Level::INFO, SECTION) => format!("[{ts}] ==> {}", msg.to_uppercase()),
            (tracing::Level::INFO, SUBSECTION) => format!("[{ts}] --- {msg}"),
            (tracing::Level::INFO, STEP) => format!("[{ts}]     -> {msg}"),
            (tracing::Level::INFO, SUCCESS) => format!("[{ts}]     [ok] {msg}"),
            (tracing::Level::INFO, DRY_RUN) => format!("[{ts}]     [dry run] {msg}"),
            (tracing::Level::ERROR, _) => format!("[{ts}]     [error] {msg}"),
            (tracing::Level::WARN, _) => format!("[{ts}]     [warn] {msg}"),
            (tracing::Level::DEBUG | tracing::Level::TRACE, _) => {
                format!("[{ts}]     [debug] {msg}")
            }
            _ => format!("[{ts}]     {msg}"),
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that renders the banner-style
/// console output, one style per event target.
struct ConsoleFormatter {
    color: bool,
}

impl ConsoleFormatter {
    fn render(&self, level: tracing::Level, target: &str, msg: &str) -> String {
        let c = self.color;
        match level {
            tracing::Level::ERROR => format!("{} {msg}", paint(c, RED, "ERROR:")),
            tracing::Level::WARN => format!("{} {msg}", paint(c, YELLOW, "WARNING:")),
            tracing::Level::INFO => match target {
                SECTION => format!(
                    "\n\n{}",
                    paint(c, BLUE, &format!("[[ {} ]]", msg.to_uppercase()))
                ),
                SUBSECTION => format!("\n{}", paint(c, CYAN, &format!("[ {msg} ]"))),
                STEP => format!("  {} {msg}...", paint(c, WHITE, "->")),
                SUCCESS => format!("{} {msg}", paint(c, GREEN_BOLD, "* SUCCESS:")),
                DRY_RUN => format!("  {} {msg}", paint(c, YELLOW, "[DRY RUN]")),
                SUMMARY => format!("  {msg}"),
                _ => format!("{} {msg}", paint(c, GREEN, "INFO:")),
            },
            _ => format!("  {}", paint(c, DIM, msg)),
        }
    }
}

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = if self.color {
            extractor.message
        } else {
            strip_ansi(&extractor.message)
        };
        writeln!(
            writer,
            "{}",
            self.render(*metadata.level(), metadata.target(), &msg)
        )
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// The console filter comes from `RUST_LOG` when set, otherwise from the
/// verbose flag. The file layer always records `debug` and above to
/// `$XDG_CACHE_HOME/mint-setup/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter {
            color: color_enabled(),
        })
        .with_writer(make_writer)
        .with_filter(console_filter);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
