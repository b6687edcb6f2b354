use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Warn,
    Log,
}

impl Severity {
    fn of(level: &Level) -> Severity {
        if *level == Level::ERROR {
            Severity::Error
        } else if *level == Level::WARN {
            Severity::Warn
        } else {
            Severity::Log
        }
    }
}

fn line(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).trim_end().to_owned()
}

/// Buffers one formatted event and hands it to the browser console when
/// dropped.
pub struct ConsoleWriter {
    severity: Severity,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let msg = JsValue::from_str(&line(&self.buf));
        match self.severity {
            Severity::Error => web_sys::console::error_1(&msg),
            Severity::Warn => web_sys::console::warn_1(&msg),
            Severity::Log => web_sys::console::log_1(&msg),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> ConsoleWriter {
        ConsoleWriter {
            severity: Severity::Log,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> ConsoleWriter {
        ConsoleWriter {
            severity: Severity::of(meta.level()),
            buf: Vec::new(),
        }
    }
}

/// Routes `tracing` events from every crate to the browser console.
pub fn init() {
    let installed = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_max_level(Level::INFO)
        .without_time()
        .with_ansi(false)
        .with_target(true)
        .try_init();
    if installed.is_err() {
        web_sys::console::warn_1(&JsValue::from_str("tracing subscriber already set"));
    }
}

#[cfg(test)]
mod tests {
    use super::{Severity, line};
    use tracing::Level;

    #[test]
    fn warnings_reach_console_warn() {
        assert_eq!(Severity::of(&Level::ERROR), Severity::Error);
        assert_eq!(Severity::of(&Level::WARN), Severity::Warn);
        assert_eq!(Severity::of(&Level::INFO), Severity::Log);
        assert_eq!(Severity::of(&Level::DEBUG), Severity::Log);
    }

    #[test]
    fn formatted_event_loses_trailing_newline() {
        assert_eq!(
            line(b" WARN transition: map widget unavailable\n"),
            " WARN transition: map widget unavailable"
        );
    }
}
