#![deny(clippy::cast_possible_truncation)]

use ctor::ctor;
use std::env::var;
use tracing_subscriber::{
    fmt::format,
    EnvFilter,
};

/// Environment variable selecting the output of test logs.
pub const TRACE_VAR: &str = "LEDGER_CHECK_TRACE";

/// Output formats selectable through [`TRACE_VAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Full,
    Compact,
    Pretty,
    Json,
}

impl Format {
    /// Reads the format from the value of [`TRACE_VAR`]. Unknown values
    /// leave tracing disabled.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "1" | "true" | "on" => Some(Format::Full),
            "compact" => Some(Format::Compact),
            "pretty" => Some(Format::Pretty),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

fn install(selected: Format) {
    let builder = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer();

    // A subscriber may already be installed by another test binary helper.
    let _ = match selected {
        Format::Full => builder.try_init(),
        Format::Compact => builder.event_format(format().compact()).try_init(),
        Format::Pretty => builder.event_format(format().pretty()).try_init(),
        Format::Json => builder.json().try_init(),
    };
}

#[ctor]
pub static TRACE: () = {
    if let Some(format) = var(TRACE_VAR).ok().as_deref().and_then(Format::parse) {
        install(format);
    }
};

#[macro_export]
macro_rules! enable_tracing {
    () => {
        static _TRACE: &$crate::TRACE<()> = &$crate::TRACE;
    };
}
