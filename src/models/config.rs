//! Configuration model for cxxmate
//!
//! File classification, header-guard naming and language-server settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// cxxmate configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CxxConfig {
    #[serde(default)]
    pub files: FileConfig,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub lsp: LspConfig,
}

/// Which extensions count as headers and which as sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default = "defaults::header_extensions")]
    pub header_extensions: Vec<String>,

    #[serde(default = "defaults::source_extensions")]
    pub source_extensions: Vec<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            header_extensions: defaults::header_extensions(),
            source_extensions: defaults::source_extensions(),
        }
    }
}

impl FileConfig {
    pub fn is_header(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| contains_ext(&self.header_extensions, ext))
    }

    pub fn is_source(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| contains_ext(&self.source_extensions, ext))
    }
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn contains_ext(list: &[String], ext: &str) -> bool {
    list.iter().any(|e| e.trim_start_matches('.') == ext)
}

/// How a header guard is spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GuardStyle {
    #[default]
    Define,
    PragmaOnce,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub style: GuardStyle,

    /// Template for the `#define` macro. Placeholders: `${FILE_NAME}`,
    /// `${EXT}`, `${FILE_NAME_EXT}`, `${DIR}`.
    #[serde(default = "defaults::define_format")]
    pub define_format: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            style: GuardStyle::default(),
            define_format: defaults::define_format(),
        }
    }
}

impl GuardConfig {
    /// Canonical include-guard macro for a file: `src/my-widget.hpp` ->
    /// `MY_WIDGET_HPP` with the default format.
    pub fn macro_for(&self, path: &Path) -> String {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let ext = extension_of(path).unwrap_or("");
        let dir = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|d| d.to_str())
            .unwrap_or("");
        let name_ext = if ext.is_empty() {
            stem.to_string()
        } else {
            format!("{stem}_{ext}")
        };

        let expanded = self
            .define_format
            .replace("${FILE_NAME_EXT}", &name_ext)
            .replace("${FILE_NAME}", stem)
            .replace("${EXT}", ext)
            .replace("${DIR}", dir);

        let mut ident: String = expanded
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        if ident.starts_with(|c: char| c.is_ascii_digit()) {
            ident.insert(0, '_');
        }
        ident
    }

    /// Directive text wrapping a header body for the configured style.
    pub fn directives(&self, path: &Path) -> (String, String) {
        let name = self.macro_for(path);
        match self.style {
            GuardStyle::PragmaOnce => ("#pragma once\n".to_string(), String::new()),
            GuardStyle::Define => (
                format!("#ifndef {name}\n#define {name}\n"),
                format!("#endif // {name}\n"),
            ),
            GuardStyle::Both => (
                format!("#pragma once\n#ifndef {name}\n#define {name}\n"),
                format!("#endif // {name}\n"),
            ),
        }
    }
}

/// Language server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LspConfig {
    #[serde(default = "defaults::command")]
    pub command: String,

    #[serde(default = "defaults::args")]
    pub args: Vec<String>,

    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LspConfig {
    fn default() -> Self {
        Self {
            command: defaults::command(),
            args: defaults::args(),
            timeout_secs: defaults::timeout_secs(),
        }
    }
}

mod defaults {
    // Files
    pub fn header_extensions() -> Vec<String> {
        ["h", "hpp", "hh", "hxx"].map(String::from).to_vec()
    }
    pub fn source_extensions() -> Vec<String> {
        ["c", "cpp", "cc", "cxx"].map(String::from).to_vec()
    }

    // Guard
    pub fn define_format() -> String {
        "${FILE_NAME_EXT}".to_string()
    }

    // LSP
    pub fn command() -> String {
        "clangd".to_string()
    }
    pub fn args() -> Vec<String> {
        vec!["--background-index=false".to_string()]
    }
    pub fn timeout_secs() -> u64 {
        30
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CxxConfig::default();
        assert_eq!(config.lsp.command, "clangd");
        assert_eq!(config.lsp.timeout_secs, 30);
        assert_eq!(config.guard.style, GuardStyle::Define);
        assert!(config.files.header_extensions.contains(&"hpp".to_string()));
        assert!(config.files.source_extensions.contains(&"cpp".to_string()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CxxConfig = toml::from_str(
            r#"
            [guard]
            style = "pragma_once"
            "#,
        )
        .unwrap();
        assert_eq!(config.guard.style, GuardStyle::PragmaOnce);
        assert_eq!(config.guard.define_format, "${FILE_NAME_EXT}");
        assert_eq!(config.lsp.command, "clangd");
    }

    #[test]
    fn test_header_and_source_classification() {
        let files = FileConfig::default();
        assert!(files.is_header(Path::new("a/b.hpp")));
        assert!(!files.is_header(Path::new("a/b.cpp")));
        assert!(files.is_source(Path::new("b.cc")));
        assert!(!files.is_source(Path::new("Makefile")));
    }

    #[test]
    fn test_macro_for() {
        let guard = GuardConfig::default();
        assert_eq!(guard.macro_for(Path::new("src/my-widget.hpp")), "MY_WIDGET_HPP");

        let guard = GuardConfig {
            define_format: "${DIR}_${FILE_NAME}_H_".to_string(),
            ..Default::default()
        };
        assert_eq!(guard.macro_for(Path::new("core/util.h")), "CORE_UTIL_H_");

        let guard = GuardConfig {
            define_format: "${FILE_NAME}".to_string(),
            ..Default::default()
        };
        assert_eq!(guard.macro_for(Path::new("3d.h")), "_3D");
    }

    #[test]
    fn test_directives() {
        let guard = GuardConfig::default();
        let (open, close) = guard.directives(Path::new("foo.h"));
        assert_eq!(open, "#ifndef FOO_H\n#define FOO_H\n");
        assert_eq!(close, "#endif // FOO_H\n");
    }
}
