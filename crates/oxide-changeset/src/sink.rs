//! Output sinks.
//!
//! The compiler writes through [`OutputSink`] and never knows whether it is
//! filling a string ([`BufferSink`]) or streaming to a writer
//! ([`StreamSink`]).

use std::io::{BufWriter, Write};

use crate::error::Result;

/// Destination for generated SQL text.
pub trait OutputSink {
    /// Appends text.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn append(&mut self, text: &str) -> Result<()>;

    /// Appends text followed by a line break.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn append_line(&mut self, text: &str) -> Result<()>;

    /// Pushes buffered text to its destination. No-op for in-memory sinks.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Accumulates output in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferSink {
    buffer: String,
}

impl BufferSink {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Returns the text written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Consumes the sink, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Returns whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl OutputSink for BufferSink {
    fn append(&mut self, text: &str) -> Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }

    fn append_line(&mut self, text: &str) -> Result<()> {
        self.buffer.push_str(text);
        self.buffer.push('\n');
        Ok(())
    }
}

/// Streams output to a writer. Forward-only; nothing can be read back.
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> StreamSink<W> {
    /// Wraps `writer` in a buffered stream sink.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Flushes all buffered output and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| err.into_error().into())
    }
}

impl<W: Write> OutputSink for StreamSink<W> {
    fn append(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn append_line(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
