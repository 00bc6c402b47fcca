//! Terminal error reporting.

use expr::ExprError;

use termcolor::{Color, ColorSpec, WriteColor};
use std::io::{self, Write};

/// Prints `error` and, if it refers to a position, `expr` with a caret
/// pointing at it.
pub fn print_error<W: WriteColor>(out: &mut W, expr: &str, error: &ExprError) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "error")?;
    out.reset()?;
    writeln!(out, ": {}", error)?;

    if let Some(offset) = error.offset() {
        let column = expr.get(..offset).map(|s| s.chars().count()).unwrap_or(0);
        writeln!(out, "  {}", expr)?;
        write!(out, "  {:width$}", "", width = column)?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        writeln!(out, "^")?;
        out.reset()?;
    }

    Ok(())
}
