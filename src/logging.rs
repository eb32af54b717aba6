// tracing subscriber setup. On wasm32 formatted events go to the browser
// console; natively they go to stderr.

use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;

use crate::error::SiteError;

pub fn parse_level(level: &str) -> Result<LevelFilter, SiteError> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| SiteError::InvalidConfig(format!("unknown log level `{level}`")))
}

/// Install the global subscriber. Returns `Ok(false)` if one was already installed.
pub fn init(level: &str) -> Result<bool, SiteError> {
    let filter = parse_level(level)?;
    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .without_time()
            .with_target(true)
            .with_writer(writer()),
    );
    Ok(tracing::subscriber::set_global_default(subscriber).is_ok())
}

#[cfg(not(target_arch = "wasm32"))]
fn writer() -> fn() -> std::io::Stderr {
    std::io::stderr
}

#[cfg(target_arch = "wasm32")]
fn writer() -> console::ConsoleMakeWriter {
    console::ConsoleMakeWriter
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;

    use tracing::{Level, Metadata};
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    pub struct ConsoleMakeWriter;

    /// Buffers one formatted event and hands it to the console on drop.
    pub struct ConsoleWriter {
        level: Level,
        buffer: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            let text = String::from_utf8_lossy(&self.buffer);
            let line = JsValue::from_str(text.trim_end());
            match self.level {
                Level::ERROR => web_sys::console::error_1(&line),
                Level::WARN => web_sys::console::warn_1(&line),
                Level::INFO => web_sys::console::info_1(&line),
                _ => web_sys::console::debug_1(&line),
            }
        }
    }

    impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter {
                level: Level::INFO,
                buffer: Vec::new(),
            }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            ConsoleWriter {
                level: *meta.level(),
                buffer: Vec::new(),
            }
        }
    }
}
