//! Subscriber assembly
//!
//! Format layers are boxed so that the format and timer choices do not
//! multiply the subscriber type.

use tracing_subscriber::fmt::writer::{BoxMakeWriter, TestWriter};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{Config, Format, Writer};
use crate::error::LogError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> Result<(), LogError> {
        let filter = parse_filter(&self.config.level)?;

        Registry::default()
            .with(fmt_layer(&self.config))
            .with(filter)
            .try_init()
            .map_err(|e| LogError::AlreadyInitialized(e.to_string()))
    }
}

pub(crate) fn parse_filter(level: &str) -> Result<EnvFilter, LogError> {
    EnvFilter::try_new(level).map_err(|e| LogError::Filter {
        filter: level.to_string(),
        reason: e.to_string(),
    })
}

fn make_writer(writer: Writer) -> BoxMakeWriter {
    match writer {
        Writer::Stderr => BoxMakeWriter::new(std::io::stderr),
        Writer::Stdout => BoxMakeWriter::new(std::io::stdout),
        Writer::Test => BoxMakeWriter::new(TestWriter::new()),
    }
}

fn fmt_layer(config: &Config) -> BoxedLayer {
    let display = &config.display;
    let base = fmt::layer()
        .with_writer(make_writer(config.writer))
        .with_ansi(display.colors)
        .with_target(display.target)
        .with_file(display.source)
        .with_line_number(display.source);

    macro_rules! boxed {
        ($layer:expr) => {
            if display.time {
                $layer.boxed()
            } else {
                $layer.without_time().boxed()
            }
        };
    }

    match config.format {
        Format::Pretty => boxed!(base.pretty()),
        Format::Compact => boxed!(base.compact()),
        Format::Json => boxed!(
            base.json()
                .flatten_event(display.flatten)
                .with_current_span(true)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        let err = parse_filter("sift_check=notalevel").unwrap_err();
        assert!(matches!(err, LogError::Filter { .. }));
        assert!(err.to_string().contains("sift_check=notalevel"));
    }

    #[test]
    fn accepts_directive_lists() {
        assert!(parse_filter("info,sift_check=trace").is_ok());
    }
}
