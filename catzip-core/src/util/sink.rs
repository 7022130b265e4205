use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;

/// Shared switch that cuts a `GuardedSink` off from its inner writer.
#[derive(Clone, Debug, Default)]
pub struct Seal(Rc<Cell<bool>>);

impl Seal {
    pub fn seal(&self) {
        self.0.set(true);
    }

    pub fn is_sealed(&self) -> bool {
        self.0.get()
    }
}

/// Write adapter between the zip encoder and the caller's sink.
///
/// Counts the bytes the sink accepted. Once sealed, either explicitly or by
/// the sink's first write error, writes are accepted and discarded, so the
/// encoder's finalize-on-drop never reaches a sink whose build already failed.
pub struct GuardedSink<'a, W: Write> {
    inner: &'a mut W,
    written: u64,
    seal: Seal,
}

impl<'a, W: Write> GuardedSink<'a, W> {
    pub fn new(inner: &'a mut W, seal: Seal) -> Self {
        Self {
            inner,
            written: 0,
            seal,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl<W: Write> Write for GuardedSink<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.seal.is_sealed() {
            return Ok(buf.len());
        }
        match self.inner.write(buf) {
            Ok(k) => {
                self.written += k as u64;
                Ok(k)
            }
            Err(e) => {
                self.seal.seal();
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.seal.is_sealed() {
            return Ok(());
        }
        self.inner.flush().inspect_err(|_| self.seal.seal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky {
        accepted: Vec<u8>,
        fail_next: bool,
        calls: usize,
    }

    impl Write for Flaky {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.fail_next {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            self.accepted.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn counts_until_sealed_then_discards() {
        let mut inner = Flaky {
            accepted: Vec::new(),
            fail_next: false,
            calls: 0,
        };
        let seal = Seal::default();
        let mut sink = GuardedSink::new(&mut inner, seal.clone());
        sink.write_all(b"local header").unwrap();
        assert_eq!(sink.written(), 12);

        seal.seal();
        sink.write_all(b"central directory").unwrap();
        assert_eq!(sink.written(), 12);
        assert_eq!(inner.accepted, b"local header");
    }

    #[test]
    fn first_error_seals() {
        let mut inner = Flaky {
            accepted: Vec::new(),
            fail_next: true,
            calls: 0,
        };
        let seal = Seal::default();
        let mut sink = GuardedSink::new(&mut inner, seal.clone());
        assert!(sink.write(b"x").is_err());
        assert!(seal.is_sealed());
        sink.write_all(b"more").unwrap();
        assert_eq!(inner.calls, 1);
    }
}
