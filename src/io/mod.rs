//! Destinations for the solver's printed output.

use std::fs::File;
use std::io::{Error, ErrorKind, Result, Write};

/// Where the configuration banner, iteration table and summary go
#[derive(Default)]
pub(crate) enum PrintTarget {
    #[default]
    Stdout,
    File(File),
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>),
}

impl PrintTarget {
    fn kind(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::File(_) => "file",
            Self::Buffer(_) => "buffer",
            Self::Stream(_) => "stream",
        }
    }
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrintTarget({})", self.kind())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            Self::Stdout => std::io::stdout().lock().write(buf),
            Self::File(f) => f.write(buf),
            Self::Buffer(v) => {
                v.extend_from_slice(buf);
                Ok(buf.len())
            }
            Self::Stream(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            Self::Stdout => std::io::stdout().flush(),
            Self::File(f) => f.flush(),
            Self::Buffer(_) => Ok(()),
            Self::Stream(s) => s.flush(),
        }
    }
}

/// Redirection of a solver's printed output.  Printing is
/// still switched on and off by the `verbose` setting.
pub trait ConfigurablePrintTarget {
    /// Print to standard output (the default)
    fn print_to_stdout(&mut self);
    /// Print to a file, which is flushed at the end of each solve
    fn print_to_file(&mut self, file: File);
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// Collect output in memory; see [`get_print_buffer`](ConfigurablePrintTarget::get_print_buffer)
    fn print_to_buffer(&mut self);
    /// Everything written since [`print_to_buffer`](ConfigurablePrintTarget::print_to_buffer).
    /// Fails when output is not buffered.
    fn get_print_buffer(&mut self) -> Result<String>;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = Self::Stdout;
    }

    fn print_to_file(&mut self, file: File) {
        *self = Self::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = Self::Stream(stream);
    }

    fn print_to_buffer(&mut self) {
        *self = Self::Buffer(Vec::new());
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        match self {
            Self::Buffer(v) => Ok(String::from_utf8_lossy(v).into_owned()),
            other => Err(Error::new(
                ErrorKind::Other,
                format!("output goes to {}, not a buffer", other.kind()),
            )),
        }
    }
}
