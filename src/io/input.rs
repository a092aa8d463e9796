use std::io::{self, BufRead};

/// Splits a byte stream into lines.
///
/// Lines end at `\n`; a final line without one is still returned. Invalid
/// UTF-8 is replaced rather than rejected.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        LineReader { inner, buf: Vec::new() }
    }

    /// `Ok(None)` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let n = self.inner.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
