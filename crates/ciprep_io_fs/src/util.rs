use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use regex::Regex;
use tempfile::NamedTempFile;

use crate::spec::{
    EnumPatternMode, SpecFileEligibility, SpecRenameRule, TransformTreeError,
};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypePatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

pub(crate) fn compile_patterns(
    patterns: &[String],
    rule_pattern: EnumPatternMode,
) -> Result<Option<TypePatternSeq>, TransformTreeError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumPatternMode::Literal => Ok(Some(TypePatternSeq::Literal(patterns.to_vec()))),
        EnumPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| {
                        TransformTreeError::InvalidPattern(format!(
                            "Invalid pattern in `patterns_exclude_dirs`: {e}"
                        ))
                    })?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypePatternSeq::Glob(l_glob)))
        }
        EnumPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|e| {
                    TransformTreeError::InvalidPattern(format!(
                        "Invalid pattern in `patterns_exclude_dirs`: {e}"
                    ))
                })?;
                l_regex.push(regex);
            }
            Ok(Some(TypePatternSeq::Regex(l_regex)))
        }
    }
}

/// Literal patterns match as substrings of the basename.
pub(crate) fn is_pattern_matching(value: &str, patterns: Option<&TypePatternSeq>) -> bool {
    match patterns {
        None => false,
        Some(TypePatternSeq::Literal(v)) => v.iter().any(|p| value.contains(p.as_str())),
        Some(TypePatternSeq::Glob(v)) => v.iter().any(|p| p.is_match(value)),
        Some(TypePatternSeq::Regex(v)) => v.iter().any(|p| p.is_match(value)),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileRules

fn _has_extension(name_file: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return false;
    }
    name_file
        .strip_suffix(extension)
        .is_some_and(|stem| stem.ends_with('.'))
}

/// Whether a file with this basename is copied at all.
pub(crate) fn is_file_eligible(name_file: &str, spec_eligibility: &SpecFileEligibility) -> bool {
    if let Some(extensions_include) = &spec_eligibility.extensions_include
        && !extensions_include
            .iter()
            .any(|ext| _has_extension(name_file, ext))
    {
        return false;
    }
    if spec_eligibility
        .extensions_exclude
        .iter()
        .any(|ext| _has_extension(name_file, ext))
    {
        return false;
    }
    !spec_eligibility
        .suffixes_exclude
        .iter()
        .any(|suffix| !suffix.is_empty() && name_file.ends_with(suffix.as_str()))
}

/// First matching rename target, if any.
pub(crate) fn resolve_destination_name<'a>(
    name_file: &str,
    rules_rename: &'a [SpecRenameRule],
) -> Option<&'a str> {
    rules_rename
        .iter()
        .find(|rule| name_file.ends_with(rule.suffix.as_str()))
        .map(|rule| rule.name_dst.as_str())
}

/// Rename targets must stay inside the mirrored directory.
pub(crate) fn validate_rename_rules(
    rules_rename: &[SpecRenameRule],
) -> Result<(), TransformTreeError> {
    for (idx, rule) in rules_rename.iter().enumerate() {
        if rule.suffix.is_empty() {
            return Err(TransformTreeError::InvalidRenameRule(format!(
                "Empty suffix in `rules_rename` at step {idx}."
            )));
        }
        if !is_plain_file_name(&rule.name_dst) {
            return Err(TransformTreeError::InvalidRenameRule(format!(
                "Rename target must be a bare file name: {:?}",
                rule.name_dst
            )));
        }
    }
    Ok(())
}

/// Non-empty, single path component, not `.` or `..`.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    let path_abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    // Resolve the deepest existing ancestor so a not-yet-created destination
    // compares against the canonical source.
    let mut path_cursor = path_abs.as_path();
    let mut l_tail = Vec::new();
    while let Some(path_parent) = path_cursor.parent() {
        if let Some(name) = path_cursor.file_name() {
            l_tail.push(name.to_os_string());
        }
        if let Ok(resolved) = fs::canonicalize(path_parent) {
            return l_tail.iter().rev().fold(resolved, |acc, name| acc.join(name));
        }
        path_cursor = path_parent;
    }
    path_abs
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

/// Mirror `path_src` from under `path_dir_src` to under `path_dir_dst`.
pub(crate) fn derive_destination_path(
    path_src: &Path,
    path_dir_src: &Path,
    path_dir_dst: &Path,
) -> PathBuf {
    match path_src.strip_prefix(path_dir_src) {
        Ok(path_rel) if path_rel.as_os_str().is_empty() => path_dir_dst.to_path_buf(),
        Ok(path_rel) => path_dir_dst.join(path_rel),
        Err(_) => path_dir_dst.join(path_src.file_name().unwrap_or_default()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Writers

/// Write `txt` to a temp file beside `path_file_dst`, then rename over it.
///
/// Readers never observe a half-written destination. `permissions` (usually
/// the source file's) replace the temp file's private default mode.
pub(crate) fn write_text_atomic(
    path_file_dst: &Path,
    txt: &str,
    permissions: Option<fs::Permissions>,
) -> io::Result<()> {
    let path_dir_dst = path_file_dst.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Failed to derive parent directory: {}",
                path_file_dst.display()
            ),
        )
    })?;
    let mut file_tmp = NamedTempFile::new_in(path_dir_dst)?;
    file_tmp.write_all(txt.as_bytes())?;
    file_tmp.flush()?;
    if let Some(permissions) = permissions {
        fs::set_permissions(file_tmp.path(), permissions)?;
    }
    file_tmp.persist(path_file_dst).map_err(|e| e.error)?;
    Ok(())
}

pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    #[cfg(target_os = "linux")]
    {
        apply_metadata_linux(path_file_src, path_file_dst)?;
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn apply_metadata_linux(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::{
        compile_patterns, derive_destination_path, is_file_eligible, is_overlap,
        is_pattern_matching, resolve_destination_name, validate_rename_rules, write_text_atomic,
    };
    use crate::spec::{EnumPatternMode, SpecFileEligibility, SpecRenameRule, TransformTreeError};

    #[test]
    fn eligibility_by_extension_and_suffix() {
        let spec_eligibility = SpecFileEligibility {
            extensions_include: Some(vec![".c".to_string(), "hpp".to_string()]),
            extensions_exclude: Vec::new(),
            suffixes_exclude: vec!["main.c".to_string()],
        };

        assert!(is_file_eligible("lexer.c", &spec_eligibility));
        assert!(is_file_eligible("vec.hpp", &spec_eligibility));
        assert!(!is_file_eligible("CMakeLists.txt", &spec_eligibility));
        assert!(!is_file_eligible("lexer.cc", &spec_eligibility));
        assert!(!is_file_eligible("main.c", &spec_eligibility));
        assert!(!is_file_eligible("testmain.c", &spec_eligibility));
        assert!(is_file_eligible("maininternaltests.c", &spec_eligibility));
    }

    #[test]
    fn eligibility_all_except_excluded_extension() {
        let spec_eligibility = SpecFileEligibility {
            extensions_include: None,
            extensions_exclude: vec![".txt".to_string()],
            suffixes_exclude: Vec::new(),
        };

        assert!(is_file_eligible("a.c", &spec_eligibility));
        assert!(is_file_eligible("Makefile", &spec_eligibility));
        assert!(!is_file_eligible("CMakeLists.txt", &spec_eligibility));
    }

    #[test]
    fn rename_first_match_wins() {
        let rules_rename = vec![
            SpecRenameRule::new("tests.c", "first.c"),
            SpecRenameRule::new("maininternaltests.c", "main.c"),
        ];
        assert_eq!(
            resolve_destination_name("maininternaltests.c", &rules_rename),
            Some("first.c")
        );
        assert_eq!(resolve_destination_name("lexer.c", &rules_rename), None);
    }

    #[test]
    fn rename_rejects_path_targets() {
        let err = validate_rename_rules(&[SpecRenameRule::new("a.c", "../a.c")])
            .expect_err("path target");
        assert!(matches!(err, TransformTreeError::InvalidRenameRule(_)));
        let err =
            validate_rename_rules(&[SpecRenameRule::new("", "a.c")]).expect_err("empty suffix");
        assert!(matches!(err, TransformTreeError::InvalidRenameRule(_)));
    }

    #[test]
    fn dir_patterns_per_mode() {
        let patterns = vec![".git".to_string()];
        let seq_literal = compile_patterns(&patterns, EnumPatternMode::Literal).expect("literal");
        assert!(is_pattern_matching(".git", seq_literal.as_ref()));
        assert!(is_pattern_matching(".github", seq_literal.as_ref()));

        let seq_glob =
            compile_patterns(&["build*".to_string()], EnumPatternMode::Glob).expect("glob");
        assert!(is_pattern_matching("build-debug", seq_glob.as_ref()));
        assert!(!is_pattern_matching("src", seq_glob.as_ref()));

        let seq_regex =
            compile_patterns(&["^te?mp$".to_string()], EnumPatternMode::Regex).expect("regex");
        assert!(is_pattern_matching("tmp", seq_regex.as_ref()));
        assert!(!is_pattern_matching("tmpl", seq_regex.as_ref()));

        let err = compile_patterns(&["(".to_string()], EnumPatternMode::Regex)
            .expect_err("invalid regex");
        assert!(matches!(err, TransformTreeError::InvalidPattern(_)));
        assert!(compile_patterns(&[], EnumPatternMode::Glob).expect("empty").is_none());
    }

    #[test]
    fn destination_path_mirrors_relative_position() {
        let path_dir_src = Path::new("/p/adorad");
        let path_dir_dst = Path::new("/p/AdoradInternalTests");
        assert_eq!(
            derive_destination_path(Path::new("/p/adorad/compiler"), path_dir_src, path_dir_dst),
            PathBuf::from("/p/AdoradInternalTests/compiler")
        );
        assert_eq!(
            derive_destination_path(path_dir_src, path_dir_src, path_dir_dst),
            PathBuf::from("/p/AdoradInternalTests")
        );
    }

    #[test]
    fn overlap_detects_nested_missing_destination() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir");

        assert!(is_overlap(&src, &src.join("out/nested")));
        assert!(!is_overlap(&src, &tmp.path().join("dst")));
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("a.c");
        std::fs::write(&path_file, "old content that is longer").expect("write");

        write_text_atomic(&path_file, "new", None).expect("atomic write");
        assert_eq!(std::fs::read_to_string(&path_file).expect("read"), "new");
        let n_entries = std::fs::read_dir(tmp.path()).expect("ls").count();
        assert_eq!(n_entries, 1);
    }
}
