use crate::protocol::TerminalAction::{CarriageReturn, CursorUp, EraseLine, LineFeed, Text};
use vte::{Params, Parser, Perform};

/// What a byte stream written to the terminal does, as far as the status
/// display protocol is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAction {
    Text(char),
    LineFeed,
    CarriageReturn,
    CursorUp(u16),
    EraseLine,
}

/// A wrapper over [Parser] and [Perform] which takes bytes in and exposes the
/// actions relevant to drawing and erasing status blocks. Anything else is dropped.
pub struct TerminalParser {
    parser: Parser,
}

impl Default for TerminalParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Vec<TerminalAction> {
        let mut performer = Performer::default();
        for byte in bytes {
            self.parser.advance(&mut performer, *byte)
        }
        performer.actions
    }
}

/// One redraw pass: lines erased from the previous block, then lines written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pub erased: usize,
    pub written: usize,
}

/// Splits actions into redraw passes. A pass starts at the first erase that
/// follows written output.
pub fn frames(actions: &[TerminalAction]) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut current = Frame::default();
    for action in actions {
        match action {
            EraseLine => {
                if current.written > 0 {
                    frames.push(current);
                    current = Frame::default();
                }
                current.erased += 1;
            }
            LineFeed => current.written += 1,
            _ => {}
        }
    }
    if current != Frame::default() {
        frames.push(current);
    }
    frames
}

#[derive(Default)]
struct Performer {
    actions: Vec<TerminalAction>,
}

impl Perform for Performer {
    fn print(&mut self, c: char) {
        self.actions.push(Text(c))
    }

    fn execute(&mut self, byte: u8) {
        let action = match byte {
            10 => LineFeed,
            13 => CarriageReturn,
            _ => return,
        };
        self.actions.push(action);
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, c: char) {
        if intermediates.is_empty() {
            let action = match (c, params.first_or(0)) {
                ('A', count) => CursorUp(count.max(1)),
                ('K', 2) => EraseLine,
                _ => return,
            };
            self.actions.push(action);
        }
    }
}

trait ParamsFirst {
    fn first_or(&self, default: u16) -> u16;
}

impl ParamsFirst for Params {
    fn first_or(&self, default: u16) -> u16 {
        self.iter()
            .next()
            .and_then(|x| x.first().copied())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_erase_protocol() {
        let actions = TerminalParser::new().parse_bytes(b"a\n\x1b[1A\x1b[2K\x1b[1m\x1b[0K");
        assert_eq!(actions, [Text('a'), LineFeed, CursorUp(1), EraseLine]);
    }

    #[test]
    fn groups_passes() {
        let bytes = b"x\ny\n\x1b[1A\x1b[2K\x1b[1A\x1b[2Kz\n\x1b[1A\x1b[2K";
        let actions = TerminalParser::new().parse_bytes(bytes);
        assert_eq!(
            frames(&actions),
            [
                Frame { erased: 0, written: 2 },
                Frame { erased: 2, written: 1 },
                Frame { erased: 1, written: 0 },
            ]
        );
    }

    #[test]
    fn empty_stream_has_no_frames() {
        assert!(frames(&[]).is_empty());
    }
}
