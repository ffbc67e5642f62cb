use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a plain-text subscriber filtered at `level` and returns
/// everything it logged.
pub fn capture_logs<F: FnOnce()>(level: LevelFilter, f: F) -> String {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let bytes = buf.0.lock().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
