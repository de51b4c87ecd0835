//! Helpers shared by the unit tests.

use parking_lot::Mutex;
use std::io::{Error, ErrorKind, Result, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const ROWS: u16 = 24;
const COLS: u16 = 80;

/// A terminal sink that tests and foreign writers can share.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
    broken: Arc<AtomicBool>,
}

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.bytes.lock().clone()).unwrap()
    }

    /// Makes every later write fail, as if the terminal went away.
    pub fn break_writes(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Visible rows after replaying everything written so far, trailing blank
    /// rows removed.
    pub fn screen_lines(&self) -> Vec<String> {
        // The tty turns `\n` into `\r\n` on output; vt100 does not.
        let bytes = self.text().replace('\n', "\r\n");
        let mut parser = vt100::Parser::new(ROWS, COLS, 0);
        parser.process(bytes.as_bytes());
        let mut lines: Vec<String> = parser
            .screen()
            .rows(0, COLS)
            .map(|row| row.trim_end().to_owned())
            .collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines
    }

    pub fn screen(&self) -> String {
        self.screen_lines().join("\n")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(Error::new(ErrorKind::BrokenPipe, "terminal closed"));
        }
        self.bytes.lock().write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Lets spawned tasks whose timers fired run to their next await point.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
