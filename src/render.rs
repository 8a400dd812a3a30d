//! Human-readable rendering of [`NormalizedError`]
//!
//! Without a request id the error renders as its bare message. With one, the
//! output leads with the request id, then the HTTP status when known, then the
//! message, followed by the warnings list after a blank line:
//!
//! ```text
//! Request `123e4567-e89b-12d3-a456-426614174000` returned 429: rate limited
//!
//! ['slow down']
//! ```

use crate::normalized::NormalizedError;
use std::fmt::{self, Write};

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(request_id) = self.request_id() else {
            return write!(f, "{}", self.error());
        };

        match self.http_status() {
            Some(status) => write!(f, "Request `{request_id}` returned {status}: {}", self.error())?,
            None => write!(f, "Request `{request_id}` returned {}", self.error())?,
        }

        match self.warnings() {
            Some(warnings) if !warnings.is_empty() => {
                f.write_str("\n\n")?;
                write_warning_list(f, warnings)
            }
            _ => Ok(()),
        }
    }
}

/// `['first', 'second']`
fn write_warning_list(out: &mut impl Write, warnings: &[String]) -> fmt::Result {
    out.write_char('[')?;
    for (i, warning) in warnings.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_quoted(out, warning)?;
    }
    out.write_char(']')
}

/// Single quotes unless the text contains one and no double quote.
fn write_quoted(out: &mut impl Write, text: &str) -> fmt::Result {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    out.write_char(quote)?;
    for c in text.chars() {
        match c {
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if c == quote => {
                out.write_char('\\')?;
                out.write_char(c)?;
            }
            c if c.is_control() => write!(out, "\\x{:02x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char(quote)
}
