use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{registry, Layer};

/// Buffers one formatted event and hands it to `console.log` on drop.
struct ConsoleWriter {
    buf: Vec<u8>,
}

impl std::io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&line.into());
        }
    }
}

struct ConsoleWriterMaker;

impl<'a> MakeWriter<'a> for ConsoleWriterMaker {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter { buf: Vec::new() }
    }
}

/// Routes `tracing` output and panics to the browser console.
pub(super) fn install() {
    console_error_panic_hook::set_once();

    // No wall clock on wasm32-unknown-unknown.
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(ConsoleWriterMaker)
        .with_filter(LevelFilter::DEBUG);

    if registry().with(layer).try_init().is_err() {
        web_sys::console::warn_1(&"drawcast: logger already installed".into());
    }
}
