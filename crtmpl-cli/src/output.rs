use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Error};
use tempfile::NamedTempFile;

pub const STDIN_STDOUT: &str = "-";

/// Where rendered text goes.
///
/// Files are staged in a temporary file next to the target and only
/// replace it on [`Output::commit`].
pub struct Output {
    target: Option<(PathBuf, NamedTempFile)>,
}

impl Output {
    pub fn new(filename: &Path) -> Result<Output, Error> {
        if filename == Path::new(STDIN_STDOUT) {
            return Ok(Output { target: None });
        }
        let filename = std::env::current_dir()?.join(filename);
        let dir = filename
            .parent()
            .ok_or_else(|| anyhow!("cannot write to root"))?;
        let staged = NamedTempFile::new_in(dir)
            .with_context(|| format!("unable to stage output in '{}'", dir.display()))?;
        Ok(Output {
            target: Some((filename, staged)),
        })
    }

    /// Writes a rendered template, optionally followed by a newline.
    pub fn write_rendered(&mut self, rendered: &str, newline: bool) -> Result<(), Error> {
        self.write_all(rendered.as_bytes())?;
        if newline {
            self.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Moves staged output into place.  Stdout is only flushed.
    pub fn commit(&mut self) -> Result<(), Error> {
        match self.target.take() {
            Some((filename, staged)) => {
                staged
                    .persist(&filename)
                    .with_context(|| format!("unable to write '{}'", filename.display()))?;
            }
            None => io::stdout().flush()?,
        }
        Ok(())
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.target {
            Some((_, ref mut staged)) => staged.write(buf),
            None => io::stdout().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.target {
            Some((_, ref mut staged)) => staged.flush(),
            None => io::stdout().flush(),
        }
    }
}
