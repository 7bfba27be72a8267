use std::fmt;

use crate::compiler::tokens::Span;
use crate::error::ErrorKind;

/// Renders an excerpt of the template around the failing location.
///
/// Up to three lines of context are shown before and after the line the
/// error points to.  Single line spans are underlined.
pub(crate) fn render_debug_info(
    f: &mut fmt::Formatter,
    name: Option<&str>,
    kind: ErrorKind,
    span: Option<Span>,
    source: &str,
) -> fmt::Result {
    let title = format!(
        " {} ",
        name.and_then(|x| x.rsplit(['/', '\\']).next())
            .unwrap_or("Template Source")
    );
    writeln!(f)?;
    writeln!(f, "{:-^1$}", title, 79)?;
    let lines: Vec<_> = source.lines().enumerate().collect();
    let idx = span.map_or(1, |x| x.start_line as usize).saturating_sub(1);
    let skip = idx.saturating_sub(3);
    let pre = lines.iter().skip(skip).take(3.min(idx)).collect::<Vec<_>>();
    let post = lines.iter().skip(idx + 1).take(3).collect::<Vec<_>>();
    for (idx, line) in pre {
        writeln!(f, "{:>4} | {}", idx + 1, line)?;
    }

    writeln!(
        f,
        "{:>4} > {}",
        idx + 1,
        lines.get(idx).map_or("", |x| x.1)
    )?;
    if let Some(span) = span {
        if span.start_line == span.end_line {
            writeln!(
                f,
                "     i {}{} {}",
                " ".repeat(span.start_col.saturating_sub(1) as usize),
                "^".repeat(span.end_col.saturating_sub(span.start_col).max(1) as usize),
                kind,
            )?;
        }
    }

    for (idx, line) in post {
        writeln!(f, "{:>4} | {}", idx + 1, line)?;
    }
    write!(f, "{:~^1$}", "", 79)
}
