//! Built-in rule preset and TOML rule-set loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::spec::{
    EnumIoErrorStrategy, EnumPatternMode, EnumSymlinkStrategy, SpecFileEligibility,
    SpecRenameRule, SpecSubstitution, SpecTransformOptions, TransformTreeError,
};

/// Default source directory name under the project root.
pub const C_DIR_SOURCE_DEFAULT: &str = "adorad";
/// Default destination directory name under the project root.
pub const C_DIR_DESTINATION_DEFAULT: &str = "AdoradInternalTests";
/// Build output directory (relative to the project root) holding per-config subdirectories.
pub const C_DIR_BIN_DEFAULT: &str = "build/bin";
/// Build configuration names emitted by multi-config generators.
pub const TUP_BUILD_CONFIG_NAMES: [&str; 4] =
    ["Debug", "Release", "ReleaseWithDebInfo", "MinSizeRelease"];

/// Extensions copied by the preset.
pub const TUP_EXTENSIONS_SOURCE: [&str; 4] = [".c", ".cpp", ".h", ".hpp"];
/// Directories never mirrored.
pub const TUP_DIRS_EXCLUDED: [&str; 1] = [".git"];
/// Directories whose files lose their internal-linkage qualifiers.
pub const TUP_DIRS_LINKAGE_STRIPPED: [&str; 1] = ["compiler"];

/// Build the preset that prepares the compiler tree for internal tests.
///
/// The library entry point (`main.c`) is dropped and the test entry point
/// (`maininternaltests.c`) takes its name. The project name is rewritten so
/// the copy builds as a separate target, and linkage qualifiers are stripped
/// under `compiler` only (stripping them in the bundled standard library
/// causes multiple-definition link errors).
pub fn derive_default_transform_options() -> SpecTransformOptions {
    SpecTransformOptions {
        eligibility: SpecFileEligibility {
            extensions_include: Some(TUP_EXTENSIONS_SOURCE.iter().map(|s| s.to_string()).collect()),
            extensions_exclude: Vec::new(),
            suffixes_exclude: vec!["main.c".to_string()],
        },
        patterns_exclude_dirs: TUP_DIRS_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        rule_pattern: EnumPatternMode::Literal,
        rules_rename: vec![
            SpecRenameRule::new("adorad.h", "AdoradInternalTests.h"),
            SpecRenameRule::new("maininternaltests.c", "main.c"),
        ],
        substitutions: vec![
            SpecSubstitution::new("adorad", "AdoradInternalTests"),
            SpecSubstitution::new("AdoradInternalTests Language", "Adorad Language"),
            SpecSubstitution::new("adorad.h", "AdoradInternalTests.h"),
        ],
        substitutions_conditional: vec![
            SpecSubstitution::new("static inline ", ""),
            SpecSubstitution::new("static ", ""),
            SpecSubstitution::new("inline ", ""),
            SpecSubstitution::new("extern ", ""),
            SpecSubstitution::new("\"C\" {", "extern \"C\" {"),
        ],
        dirs_eligible: TUP_DIRS_LINKAGE_STRIPPED.iter().map(|s| s.to_string()).collect(),
        substitutions_trailing: vec![SpecSubstitution::new("// \"C\"", "// extern \"C\"")],
        rule_symlink: EnumSymlinkStrategy::Dereference,
        rule_io_error: EnumIoErrorStrategy::Abort,
        if_dry_run: false,
    }
}

/// Parse a TOML rule set. Missing keys fall back to [`SpecTransformOptions::default`].
pub fn parse_transform_options(txt: &str) -> Result<SpecTransformOptions, TransformTreeError> {
    toml::from_str(txt).map_err(|e| TransformTreeError::InvalidConfig {
        path: PathBuf::from("<inline>"),
        message: e.to_string(),
    })
}

/// Read and parse a TOML rule set from disk.
pub fn read_transform_options<P: AsRef<Path>>(
    path_config: P,
) -> Result<SpecTransformOptions, TransformTreeError> {
    let path_config = path_config.as_ref();
    let txt = fs::read_to_string(path_config).map_err(|e| TransformTreeError::InvalidConfig {
        path: path_config.to_path_buf(),
        message: e.to_string(),
    })?;
    log::debug!("Loaded rule set from {}", path_config.display());
    toml::from_str(&txt).map_err(|e| TransformTreeError::InvalidConfig {
        path: path_config.to_path_buf(),
        message: e.to_string(),
    })
}
