use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::config::ConfigError;

const INVALID_FILE_EXT_CHARS: [char; 2] = ['/', '.'];

/// A supported source language.
///
/// The set is closed: anything else is rejected when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    C,
    Cpp,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Python, Language::C, Language::Cpp];

    /// Identifier used in requests and configuration
    pub fn id(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "Python 3",
            Language::C => "C (GCC)",
            Language::Cpp => "C++ (GCC)",
        }
    }

    /// Whether programs in this language are built before they run
    pub fn requires_compilation(self) -> bool {
        matches!(self, Language::C | Language::Cpp)
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.id() == s)
            .ok_or_else(|| ConfigError::UnsupportedLanguage(s.to_owned()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// How to build and run programs of one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    /// Extension given to materialized source files
    pub extension: FileExtension,

    /// Compiler command with placeholders (None for interpreted languages)
    /// Placeholders: {source}, {output}
    #[serde(default)]
    pub compile: Option<Vec<String>>,

    /// Run command with placeholders
    /// Placeholders: {source}, {binary}
    pub run: Vec<String>,
}

impl Toolchain {
    pub fn python() -> Self {
        Self {
            extension: FileExtension("py".to_owned()),
            compile: None,
            run: strings(&["python3", "{source}"]),
        }
    }

    pub fn c() -> Self {
        Self {
            extension: FileExtension("c".to_owned()),
            compile: Some(strings(&["gcc", "{source}", "-o", "{output}"])),
            run: strings(&["{binary}"]),
        }
    }

    pub fn cpp() -> Self {
        Self {
            extension: FileExtension("cpp".to_owned()),
            compile: Some(strings(&["g++", "{source}", "-o", "{output}"])),
            run: strings(&["{binary}"]),
        }
    }

    /// Check if the toolchain has a compile step
    pub fn is_compiled(&self) -> bool {
        self.compile.is_some()
    }

    /// Compiler invocation for `source`, writing the executable to `output`
    pub fn compile_command(&self, source: &Path, output: &Path) -> Option<Vec<String>> {
        self.compile
            .as_ref()
            .map(|command| expand_command(command, &display(source), &display(output)))
    }

    /// Run invocation; `binary` is the compiled executable, or the source
    /// itself for interpreted languages
    pub fn run_command(&self, source: &Path, binary: &Path) -> Vec<String> {
        expand_command(&self.run, &display(source), &display(binary))
    }
}

/// Expand placeholders in the given command
pub fn expand_command(command: &[String], source: &str, binary: &str) -> Vec<String> {
    command
        .iter()
        .map(|arg| {
            arg.replace("{source}", source)
                .replace("{output}", binary)
                .replace("{binary}", binary)
        })
        .collect()
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| (*arg).to_owned()).collect()
}

/// Per-language toolchain table, one entry per [`Language`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Languages {
    #[serde(default = "Toolchain::python")]
    pub python: Toolchain,

    #[serde(default = "Toolchain::c")]
    pub c: Toolchain,

    #[serde(default = "Toolchain::cpp")]
    pub cpp: Toolchain,
}

impl Languages {
    pub fn get(&self, language: Language) -> &Toolchain {
        match language {
            Language::Python => &self.python,
            Language::C => &self.c,
            Language::Cpp => &self.cpp,
        }
    }

    /// Iterate over every language with its toolchain
    pub fn iter(&self) -> impl Iterator<Item = (Language, &Toolchain)> {
        Language::ALL
            .into_iter()
            .map(move |language| (language, self.get(language)))
    }
}

impl Default for Languages {
    fn default() -> Self {
        Self {
            python: Toolchain::python(),
            c: Toolchain::c(),
            cpp: Toolchain::cpp(),
        }
    }
}

/// File extension without dot (e.g., "cpp")
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileExtension(String);

impl FileExtension {
    pub fn new(extension: &str) -> Result<Self, ConfigError> {
        let contains_invalid = extension
            .chars()
            .any(|c| INVALID_FILE_EXT_CHARS.contains(&c));
        if contains_invalid {
            return Err(ConfigError::InvalidFileExtChars);
        }
        Ok(Self(extension.to_owned()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for FileExtension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileExtension::new(&s).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a file extension without '/' or '.' characters",
            )
        })
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
