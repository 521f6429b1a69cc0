//! Terminal rendering of result sets.
//!
//! Layout per record:
//!
//! ```text
//! <path>:<line>
//! @<name>(<value>)
//!   <class>:<function>
//! --
//! ```
//!
//! preceded once by a `#` separator line. Colors are cosmetic; with color
//! disabled the output is plain text.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use crate::query::ResultSet;

#[derive(Debug, Clone, Copy)]
pub struct PrettyOptions {
    pub color: bool,
    /// Terminal width; the separator is one character shorter.
    pub width: usize,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            color: false,
            width: 80,
        }
    }
}

impl PrettyOptions {
    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl ResultSet {
    pub fn pretty<W: Write>(&self, out: &mut W, options: &PrettyOptions) -> io::Result<()> {
        let separator = "#".repeat(options.width.saturating_sub(1).max(1));
        writeln!(out, "{}", options.paint(&separator, |s| s.magenta()))?;

        for record in self {
            writeln!(
                out,
                "{}:{}",
                options.paint(&record.path, |s| s.yellow()),
                options.paint(&record.line.to_string(), |s| s.bright_white())
            )?;
            for decorator in &record.decorators {
                writeln!(
                    out,
                    "@{}({})",
                    options.paint(&decorator.name, |s| s.bold()),
                    options.paint(&decorator.value, |s| s.white())
                )?;
            }
            writeln!(
                out,
                "  {}:{}",
                options.paint(&record.class_name, |s| s.green()),
                options.paint(&record.function, |s| s.bright_green())
            )?;
            writeln!(out, "--")?;
        }

        Ok(())
    }

    pub fn render(&self, options: &PrettyOptions) -> String {
        let mut buf = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.pretty(&mut buf, options);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Decorator, FunctionRecord};

    fn accounts() -> ResultSet {
        ResultSet::from_records(vec![
            FunctionRecord {
                path: "src/Accounts.java".to_string(),
                class_name: "Accounts".to_string(),
                function: "get".to_string(),
                line: 6,
                decorators: vec![
                    Decorator::new("Path", "/accounts"),
                    Decorator::marker("GET"),
                    Decorator::marker("Auth"),
                ],
            },
            FunctionRecord {
                path: "src/Util.java".to_string(),
                class_name: "Util".to_string(),
                function: "helper".to_string(),
                line: 3,
                decorators: Vec::new(),
            },
        ])
    }

    #[test]
    fn plain_rendering_is_exact() {
        let options = PrettyOptions {
            color: false,
            width: 11,
        };
        let expected = "\
##########
src/Accounts.java:6
@Path(/accounts)
@GET()
@Auth()
  Accounts:get
--
src/Util.java:3
  Util:helper
--
";
        assert_eq!(accounts().render(&options), expected);
    }

    #[test]
    fn empty_set_prints_only_the_separator() {
        let options = PrettyOptions {
            color: false,
            width: 4,
        };
        assert_eq!(ResultSet::empty().render(&options), "###\n");
    }

    #[test]
    fn tiny_width_still_prints_a_separator() {
        let options = PrettyOptions {
            color: false,
            width: 0,
        };
        assert!(ResultSet::empty().render(&options).starts_with("#\n"));
    }

    #[test]
    fn colored_rendering_keeps_the_text() {
        colored::control::set_override(true);
        let options = PrettyOptions {
            color: true,
            width: 10,
        };
        let out = accounts().render(&options);
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("Accounts"));
        assert!(out.contains("/accounts"));
    }
}
