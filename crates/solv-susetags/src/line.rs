//! Assembly of logical lines from physical input lines.
//!
//! Most susetags records occupy one physical line. Two block forms span more:
//!
//! ```text
//! +Des:                 +Req:
//! first paragraph       libfoo.so.1
//! second paragraph      bash
//! -Des:                 -Req:
//! ```
//!
//! Cumulative tags (`Des`, `Eul`, `Ins`, `Del`, `Aut`) join their body lines
//! into a single `=Des: first paragraph\nsecond paragraph` logical line. Every
//! other block tag is a list: each body line comes out as its own
//! `=Req: libfoo.so.1` logical line.

use std::borrow::Cow;
use std::io::BufRead;

use crate::error::{Result, SusetagsError};
use crate::tag::Tag;

/// Initial capacity of the line buffer.
const INITIAL_CAPACITY: usize = 1024;

/// Free space kept in the line buffer before every read.
const READ_MARGIN: usize = 16;

/// Minimum growth once the free space drops below [`READ_MARGIN`].
const GROW_STEP: usize = 512;

/// One assembled line, borrowed from the assembler's buffer.
#[derive(Debug)]
pub struct LogicalLine<'a> {
    /// Line text without its terminator.
    pub text: Cow<'a, str>,
    /// 1-based physical line number where the logical line started.
    pub lineno: usize,
}

/// An open `+Tag:` block.
#[derive(Debug)]
struct OpenBlock {
    /// Bytes of the close marker, `-Tag:`.
    close: Vec<u8>,
    /// Length of the `=Tag: ` prefix at the start of the buffer.
    prefix_len: usize,
    cumulative: bool,
    lineno: usize,
}

/// Turns a byte stream into logical lines. Single forward pass.
pub struct LineAssembler<R> {
    reader: R,
    buf: Vec<u8>,
    block: Option<OpenBlock>,
    lineno: usize,
}

impl<R: BufRead> LineAssembler<R> {
    pub fn new(reader: R) -> Self {
        LineAssembler {
            reader,
            buf: Vec::with_capacity(INITIAL_CAPACITY),
            block: None,
            lineno: 0,
        }
    }

    /// Number of physical lines consumed so far.
    pub fn physical_lines(&self) -> usize {
        self.lineno
    }

    /// Produce the next logical line, or `None` at end of stream.
    ///
    /// An unterminated cumulative block at end of stream is discarded.
    pub fn next_line(&mut self) -> Result<Option<LogicalLine<'_>>> {
        loop {
            let mark = match &self.block {
                None => 0,
                Some(block) if !block.cumulative => block.prefix_len,
                Some(_) => self.buf.len(),
            };
            self.buf.truncate(mark);
            self.reserve_headroom();

            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                if let Some(block) = self.block.take() {
                    tracing::debug!(
                        lineno = block.lineno,
                        "unterminated block at end of input"
                    );
                }
                return Ok(None);
            }
            self.lineno += 1;
            if self.buf.last() == Some(&b'\n') {
                self.buf.pop();
            }

            let Some(block) = &self.block else {
                if self.open_block(mark)? {
                    continue;
                }
                return Ok(Some(self.emit(self.buf.len(), self.lineno)));
            };

            let is_close = self.buf[mark..] == block.close[..];
            match (block.cumulative, is_close) {
                (true, false) => {
                    self.buf.push(b'\n');
                }
                (true, true) => {
                    let lineno = block.lineno;
                    let mut end = mark;
                    if end > block.prefix_len && self.buf[end - 1] == b'\n' {
                        end -= 1;
                    }
                    self.block = None;
                    return Ok(Some(self.emit(end, lineno)));
                }
                (false, true) => {
                    self.block = None;
                }
                (false, false) => {
                    return Ok(Some(self.emit(self.buf.len(), self.lineno)));
                }
            }
        }
    }

    /// Start a block if the line just read is a `+Tag:` opener.
    fn open_block(&mut self, mark: usize) -> Result<bool> {
        let line = &self.buf[mark..];
        if line.len() < 2 || line[0] != b'+' || line[1] == b':' {
            return Ok(false);
        }
        let Some(colon) = line.iter().position(|b| *b == b':') else {
            return Err(SusetagsError::BadTag {
                lineno: self.lineno,
                line: String::from_utf8_lossy(line).into_owned(),
            });
        };

        let name = line[1..colon].to_vec();
        let cumulative = std::str::from_utf8(&name)
            .ok()
            .and_then(Tag::from_code)
            .is_some_and(Tag::is_cumulative);

        let mut close = Vec::with_capacity(name.len() + 2);
        close.push(b'-');
        close.extend_from_slice(&name);
        close.push(b':');

        self.buf.clear();
        self.buf.push(b'=');
        self.buf.extend_from_slice(&name);
        self.buf.extend_from_slice(b": ");
        self.block = Some(OpenBlock {
            close,
            prefix_len: self.buf.len(),
            cumulative,
            lineno: self.lineno,
        });
        Ok(true)
    }

    /// Keep at least [`READ_MARGIN`] bytes free before the next read.
    fn reserve_headroom(&mut self) {
        if self.buf.capacity() - self.buf.len() < READ_MARGIN {
            self.buf.reserve(GROW_STEP + READ_MARGIN);
        }
    }

    fn emit(&self, end: usize, lineno: usize) -> LogicalLine<'_> {
        LogicalLine {
            text: String::from_utf8_lossy(&self.buf[..end]),
            lineno,
        }
    }
}
