/*
Live status lines

A block of named statuses kept at the bottom of the terminal, each redrawn once a
second with the time since it started.

Redraw:
    Erase the block drawn last time, one line up + clear line per line drawn
    Write every active status, in the order they were first added

Foreign output (anything else writing to the terminal):
    Pause: erase the block, stop redrawing, hold end callbacks
    Run the foreign operation
    Resume: draw the block below whatever was written, then run held callbacks

Line counting has to be exact, including structured arguments that print over
several lines, or the erase eats into output above the block.
*/
pub mod console;
mod gate;
mod logger;
pub mod message;
mod options;
pub mod protocol;
mod registry;
mod render;
pub mod style;
#[cfg(test)]
mod test_support;
pub mod time_format;

pub use console::{Collaborator, Console, Method, MethodTable};
pub use logger::{PauseGuard, StatusLogger};
pub use message::{format_message, Arg, DefaultFormatter, MessageFormatter};
pub use options::{LoggerOptions, DEFAULT_COLOR, DEFAULT_TICK};
pub use registry::{StatusEntry, StatusRegistry, Upsert};
pub use style::Style;
pub use time_format::format_time;

/// A console writing statuses to stdout with default options.
pub fn console() -> Console {
    Console::new(StatusLogger::default())
}
