//! Transform/relocate specification models and top-level error types.

use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Symlink handling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumSymlinkStrategy {
    /// Follow the link and read the target bytes/entries.
    #[default]
    Dereference,
    /// Ignore symlink entries (a warning is recorded).
    SkipSymlinks,
}

/// Pattern matching mode for directory exclusion lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    #[default]
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match against the basename.
    Literal,
}

/// Per-file IO failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumIoErrorStrategy {
    /// Stop the whole run on the first failing file.
    #[default]
    Abort,
    /// Record the failure in the report and continue with the next entry.
    Report,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Rules

/// One literal `pattern -> replacement` step of a substitution pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecSubstitution {
    /// Literal text to search for. Must not be empty.
    pub pattern: String,
    /// Literal text written in place of every occurrence.
    pub replacement: String,
}

impl SpecSubstitution {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Destination filename override for sources whose name ends with `suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecRenameRule {
    /// Filename suffix to match.
    pub suffix: String,
    /// Destination filename (a bare name, never a path).
    pub name_dst: String,
}

impl SpecRenameRule {
    pub fn new(suffix: impl Into<String>, name_dst: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            name_dst: name_dst.into(),
        }
    }
}

/// Which files are copied at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecFileEligibility {
    /// Allowed extensions (`".c"` or `"c"`). `None` allows every extension.
    pub extensions_include: Option<Vec<String>>,
    /// Extensions never copied, checked after `extensions_include`.
    pub extensions_exclude: Vec<String>,
    /// Filename suffixes skipped unconditionally.
    pub suffixes_exclude: Vec<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Input options for `transform_tree`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecTransformOptions {
    /// File eligibility predicate.
    pub eligibility: SpecFileEligibility,
    /// Directory basenames that are neither mirrored nor descended into.
    pub patterns_exclude_dirs: Vec<String>,
    /// Pattern interpretation mode for `patterns_exclude_dirs`.
    pub rule_pattern: EnumPatternMode,
    /// Ordered rename table, first matching suffix wins.
    pub rules_rename: Vec<SpecRenameRule>,
    /// Applied to every copied file.
    pub substitutions: Vec<SpecSubstitution>,
    /// Applied only under directories listed in `dirs_eligible`.
    pub substitutions_conditional: Vec<SpecSubstitution>,
    /// Directory path suffixes that enable `substitutions_conditional`.
    pub dirs_eligible: Vec<String>,
    /// Applied to every copied file after the conditional pass.
    pub substitutions_trailing: Vec<SpecSubstitution>,
    /// Symlink handling behavior.
    pub rule_symlink: EnumSymlinkStrategy,
    /// Per-file failure behavior.
    pub rule_io_error: EnumIoErrorStrategy,
    /// Do not mutate filesystem; record what would happen.
    pub if_dry_run: bool,
}

impl Default for SpecTransformOptions {
    fn default() -> Self {
        Self {
            eligibility: SpecFileEligibility::default(),
            patterns_exclude_dirs: Vec::new(),
            rule_pattern: EnumPatternMode::Glob,
            rules_rename: Vec::new(),
            substitutions: Vec::new(),
            substitutions_conditional: Vec::new(),
            dirs_eligible: Vec::new(),
            substitutions_trailing: Vec::new(),
            rule_symlink: EnumSymlinkStrategy::Dereference,
            rule_io_error: EnumIoErrorStrategy::Abort,
            if_dry_run: false,
        }
    }
}

/// Input options for `relocate_artifacts`.
#[derive(Debug, Clone, Default)]
pub struct SpecRelocateOptions {
    /// Do not mutate filesystem; record what would happen.
    pub if_dry_run: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// One per-file failure with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// "Top-level call failed" errors of `transform_tree`.
#[derive(Debug, Error)]
pub enum TransformTreeError {
    /// Source root does not exist.
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// Source path exists but is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        .source_dir.display(),
        .destination.display()
    )]
    SourceDestinationOverlap {
        /// Normalized source directory.
        source_dir: PathBuf,
        /// Normalized destination directory.
        destination: PathBuf,
    },
    /// Invalid directory exclusion pattern.
    #[error("{0}")]
    InvalidPattern(String),
    /// Substitution step that cannot be applied literally.
    #[error("{0}")]
    InvalidSubstitution(String),
    /// Rename rule that would produce an unsafe or empty destination name.
    #[error("{0}")]
    InvalidRenameRule(String),
    /// Rule file could not be read or parsed.
    #[error("Invalid configuration {}: {message}", .path.display())]
    InvalidConfig {
        /// Configuration file path (`<inline>` when parsed from a string).
        path: PathBuf,
        /// Reader/parser error text.
        message: String,
    },
    /// Per-file failure while `rule_io_error` is `Abort`.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// Source or destination path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// "Top-level call failed" errors of `relocate_artifacts`.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// `<bin_root>/<build_config>` does not exist.
    #[error("Build configuration directory not found: {}", .0.display())]
    BuildDirNotFound(PathBuf),
    /// Build configuration name is empty or not a single path component.
    #[error("Invalid build configuration name: {0:?}")]
    InvalidBuildConfigName(String),
    /// Listing or copy failure.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
