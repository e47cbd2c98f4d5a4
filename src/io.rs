//! Byte-level collaborators the encoder and decoder consume.

use std::io::{self, BufRead, Write};

/// Sequential source of input bytes. `Ok(None)` marks end of stream.
pub trait ByteSource {
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Append-only destination for decoded bytes.
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<R: BufRead + ?Sized> ByteSource for R {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = loop {
            match self.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if byte.is_some() {
            self.consume(1);
        }
        Ok(byte)
    }
}

impl<W: Write + ?Sized> ByteSink for W {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_source_yields_bytes_then_none() -> io::Result<()> {
        let mut source = Cursor::new(vec![7u8, 0, 255]);
        assert_eq!(source.next_byte()?, Some(7));
        assert_eq!(source.next_byte()?, Some(0));
        assert_eq!(source.next_byte()?, Some(255));
        assert_eq!(source.next_byte()?, None);
        assert_eq!(source.next_byte()?, None);
        Ok(())
    }

    #[test]
    fn test_sink_appends() -> io::Result<()> {
        let mut sink = Vec::new();
        sink.write_bytes(b"AB")?;
        sink.write_bytes(b"")?;
        sink.write_bytes(b"C")?;
        assert_eq!(sink, b"ABC");
        Ok(())
    }
}
