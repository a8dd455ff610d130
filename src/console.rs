use std::io::{self, Write};

use anstyle::{AnsiColor, Style};

/// Progress output for a terminal.
///
/// Colored text is written through a [`Colored`] guard which restores the
/// default color when it goes out of scope, also on early returns.
pub struct Console<W: Write> {
    out: W,
    accent: Style,
}

impl Console<anstream::Stdout> {
    /// Stdout console. Escape sequences are stripped when stdout is not a
    /// terminal or `NO_COLOR` is set.
    pub fn stdout() -> Self {
        Self::new(anstream::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            accent: Style::new().fg_color(Some(AnsiColor::Cyan.into())),
        }
    }

    pub fn plain(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    /// Highlighted text, as used for urls and tokens.
    pub fn accent(&mut self) -> io::Result<Colored<'_, W>> {
        let style = self.accent;
        self.colored(style)
    }

    pub fn colored(&mut self, style: Style) -> io::Result<Colored<'_, W>> {
        write!(self.out, "{}", style.render())?;
        Ok(Colored {
            out: &mut self.out,
            style,
        })
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub struct Colored<'a, W: Write> {
    out: &'a mut W,
    style: Style,
}

impl<W: Write> Write for Colored<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Drop for Colored<'_, W> {
    fn drop(&mut self) {
        let _ = write!(self.out, "{}", self.style.render_reset());
    }
}
