//! Location parsing for CLI commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::{CxxError, CxxResult};
use crate::models::lsp::Position;

/// `file:line[:column]`, 1-indexed as typed by the user.
#[derive(Debug, Clone)]
pub struct ParsedLocation {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl ParsedLocation {
    /// Parse location string and convert to absolute path in one step
    pub fn parse_absolute(input: &str) -> Result<Self> {
        Ok(Self::parse(input)?.to_absolute()?)
    }

    pub fn parse(input: &str) -> CxxResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(invalid(input, "location cannot be empty"));
        }

        let (file_part, rest) = Self::split_path_and_position(input)?;
        let (line, column) = Self::parse_position(input, rest)?;

        Ok(Self {
            file: PathBuf::from(file_part),
            line,
            column,
        })
    }

    fn split_path_and_position(input: &str) -> CxxResult<(&str, &str)> {
        let is_windows = input.len() > 2
            && input.as_bytes().get(1) == Some(&b':')
            && input.as_bytes().first().is_some_and(u8::is_ascii_alphabetic);
        let search_start = if is_windows { 2 } else { 0 };

        // First ':' followed by a digit or a sign starts the position
        let split = input[search_start..]
            .char_indices()
            .filter(|&(_, ch)| ch == ':')
            .map(|(i, _)| search_start + i)
            .find(|&i| {
                input[i + 1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit() || c == '-')
            })
            .ok_or_else(|| invalid(input, "expected file:line[:column], e.g. src/widget.h:10:5"))?;

        if input[split + 1..].starts_with('-') {
            return Err(invalid(input, "negative line numbers are not allowed"));
        }
        Ok((&input[..split], &input[split + 1..]))
    }

    fn parse_position(input: &str, rest: &str) -> CxxResult<(u32, u32)> {
        let mut parts = rest.splitn(2, ':');

        let line_str = parts.next().unwrap_or("");
        let line: u32 = line_str
            .parse()
            .map_err(|_| invalid(input, &format!("line '{line_str}' is not a positive integer")))?;

        let column: u32 = match parts.next() {
            Some(col_str) => col_str.parse().map_err(|_| {
                invalid(input, &format!("column '{col_str}' is not a positive integer"))
            })?,
            None => 1,
        };

        if line == 0 {
            return Err(invalid(input, "line numbers are 1-indexed"));
        }
        if column == 0 {
            return Err(invalid(input, "column numbers are 1-indexed"));
        }
        Ok((line, column))
    }

    /// Resolve against the current directory and canonicalize.
    pub fn to_absolute(&self) -> Result<Self> {
        Ok(Self {
            file: absolute_file(&self.file)?,
            line: self.line,
            column: self.column,
        })
    }

    /// 0-indexed position for the source model.
    pub fn position(&self) -> Position {
        Position::from_cli(self.line, self.column)
    }

    /// Reject positions past the end of `content`.
    pub fn validate_position_with_content(&self, content: &str) -> CxxResult<()> {
        let lines: Vec<&str> = content.lines().collect();
        let line_count = lines.len().max(1);
        let input = self.to_string();

        if self.line as usize > line_count {
            return Err(invalid(
                &input,
                &format!("line {} exceeds file length ({} lines)", self.line, line_count),
            ));
        }

        if let Some(line_content) = lines.get((self.line - 1) as usize) {
            let col_max = line_content.chars().count() + 1;
            if self.column as usize > col_max {
                return Err(invalid(
                    &input,
                    &format!(
                        "column {} exceeds line length ({} chars)",
                        self.column,
                        col_max - 1
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ParsedLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Absolute, canonical form of a user-supplied file path.
pub fn absolute_file(file: &Path) -> Result<PathBuf> {
    let joined = if file.is_absolute() {
        file.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(file)
    };
    joined
        .canonicalize()
        .with_context(|| format!("File not found: {}", file.display()))
}

fn invalid(input: &str, reason: &str) -> CxxError {
    CxxError::InvalidLocation {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_location() {
        let loc = ParsedLocation::parse("src/widget.h:10:5").unwrap();
        assert_eq!(loc.file, PathBuf::from("src/widget.h"));
        assert_eq!(loc.line, 10);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.position(), Position::new(9, 4));
    }

    #[test]
    fn test_parse_without_column() {
        let loc = ParsedLocation::parse("src/widget.h:10").unwrap();
        assert_eq!(loc.line, 10);
        assert_eq!(loc.column, 1);
    }

    #[test]
    fn test_parse_unicode_path() {
        let loc = ParsedLocation::parse("/tmp/한글_테스트.hpp:10:5").unwrap();
        assert_eq!(loc.file, PathBuf::from("/tmp/한글_테스트.hpp"));
        assert_eq!(loc.column, 5);
    }

    #[test]
    fn test_parse_windows_path() {
        let loc = ParsedLocation::parse("C:\\src\\widget.h:10:5").unwrap();
        assert_eq!(loc.file, PathBuf::from("C:\\src\\widget.h"));
        assert_eq!(loc.line, 10);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(ParsedLocation::parse("invalid").is_err());
        assert!(ParsedLocation::parse("widget.h").is_err());
        assert!(ParsedLocation::parse("widget.h:0:1").is_err());
        assert!(ParsedLocation::parse("widget.h:3:x").is_err());
        assert!(ParsedLocation::parse("").is_err());
    }

    #[test]
    fn test_parse_negative_line() {
        let err = ParsedLocation::parse("widget.h:-5:1").unwrap_err();
        assert!(matches!(err, CxxError::InvalidLocation { .. }));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_display() {
        let loc = ParsedLocation::parse("src/widget.h:10:5").unwrap();
        assert_eq!(loc.to_string(), "src/widget.h:10:5");
    }

    #[test]
    fn test_validate_position_with_content() {
        let content = "class A {\n  int x;\n};";
        let loc = ParsedLocation::parse("a.h:2:5").unwrap();
        assert!(loc.validate_position_with_content(content).is_ok());

        let past_end = ParsedLocation::parse("a.h:10:1").unwrap();
        assert!(past_end.validate_position_with_content(content).is_err());

        let past_line = ParsedLocation::parse("a.h:2:20").unwrap();
        assert!(past_line.validate_position_with_content(content).is_err());
    }

    #[test]
    fn test_absolute_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("a.h");
        std::fs::write(&file, "").unwrap();
        assert_eq!(absolute_file(&file).unwrap(), file.canonicalize().unwrap());
        assert!(absolute_file(&temp.path().join("missing.h")).is_err());
    }
}
