//! Source tree traversal and transform-copy orchestration.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::pipeline::{transform_text, validate_substitutions};
use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{
    EnumIoErrorStrategy, EnumSymlinkStrategy, SpecTransformOptions, TransformTreeError,
};
use crate::util::{
    TypePatternSeq, compile_patterns, derive_destination_path, is_file_eligible, is_overlap,
    is_pattern_matching, resolve_destination_name, validate_rename_rules, write_text_atomic,
};

#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: String,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: String,
}

#[derive(Debug)]
struct SpecTransformContext {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    spec_tf_options: SpecTransformOptions,
    pats_exclude_dirs: Option<TypePatternSeq>,
    builder_report: ReportCopyBuilder,
    set_ancestor_dirs: HashSet<(u64, u64)>,
    set_dirs_created: HashSet<PathBuf>,
    set_files_written: HashSet<PathBuf>,
}

/// Mirror `dir_source` into `dir_destination`, rewriting every eligible file.
///
/// For each directory (files first, then subdirectories, both in name order):
/// 1. the mirrored destination directory is created if missing;
/// 2. each eligible file gets its destination name from `rules_rename`;
/// 3. its text goes through `substitutions`, then `substitutions_conditional`
///    when the source directory path ends with an entry of `dirs_eligible`,
///    then `substitutions_trailing`;
/// 4. the result is written atomically, replacing any existing file.
///
/// All options are validated before the filesystem is touched. Per-file IO
/// failures abort the run with [`TransformTreeError::Io`] unless
/// `rule_io_error` is `Report`, in which case they land in
/// [`ReportCopy::errors`] and the walk continues.
pub fn transform_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_tf_options: SpecTransformOptions,
) -> Result<ReportCopy, TransformTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    match fs::metadata(&path_dir_src) {
        Ok(meta_dir_src) if meta_dir_src.is_dir() => {}
        Ok(_) => return Err(TransformTreeError::SourceNotDirectory(path_dir_src)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(TransformTreeError::SourceNotFound(path_dir_src));
        }
        Err(e) => {
            return Err(TransformTreeError::Io {
                path: path_dir_src,
                source: e,
            });
        }
    }
    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(TransformTreeError::SourceDestinationOverlap {
            source_dir: path_dir_src,
            destination: path_dir_dst,
        });
    }

    validate_substitutions(&spec_tf_options)?;
    validate_rename_rules(&spec_tf_options.rules_rename)?;
    let pats_exclude_dirs = compile_patterns(
        &spec_tf_options.patterns_exclude_dirs,
        spec_tf_options.rule_pattern,
    )?;

    log::info!(
        "Transforming {} -> {}{}",
        path_dir_src.display(),
        path_dir_dst.display(),
        if spec_tf_options.if_dry_run { " (dry run)" } else { "" }
    );

    let mut spec_tf_ctx = SpecTransformContext {
        path_dir_src: path_dir_src.clone(),
        path_dir_dst,
        spec_tf_options,
        pats_exclude_dirs,
        builder_report: ReportCopyBuilder::default(),
        set_ancestor_dirs: HashSet::new(),
        set_dirs_created: HashSet::new(),
        set_files_written: HashSet::new(),
    };

    walk_directory(&path_dir_src, &mut spec_tf_ctx)?;

    let report = spec_tf_ctx.builder_report.build();
    log::info!(
        "Copied {} source files from {}.",
        report.cnt_copied,
        spec_tf_ctx.path_dir_src.display()
    );
    Ok(report)
}

/// Route one per-entry IO failure through `rule_io_error`.
fn handle_io_failure(
    path: &Path,
    error: io::Error,
    spec_tf_ctx: &mut SpecTransformContext,
) -> Result<(), TransformTreeError> {
    match spec_tf_ctx.spec_tf_options.rule_io_error {
        EnumIoErrorStrategy::Abort => Err(TransformTreeError::Io {
            path: path.to_path_buf(),
            source: error,
        }),
        EnumIoErrorStrategy::Report => {
            spec_tf_ctx
                .builder_report
                .add_error(path.to_path_buf(), error.to_string());
            Ok(())
        }
    }
}

/// Returns `false` when the directory could not be created and its subtree
/// must be skipped (report mode only).
fn ensure_destination_dir(
    path_dir_dst: &Path,
    spec_tf_ctx: &mut SpecTransformContext,
) -> Result<bool, TransformTreeError> {
    if spec_tf_ctx.set_dirs_created.contains(path_dir_dst) {
        return Ok(true);
    }
    if !spec_tf_ctx.spec_tf_options.if_dry_run {
        // `create_dir_all` treats an existing directory as success.
        if let Err(e) = fs::create_dir_all(path_dir_dst) {
            handle_io_failure(path_dir_dst, e, spec_tf_ctx)?;
            return Ok(false);
        }
        log::debug!("Created directory {}", path_dir_dst.display());
    }
    spec_tf_ctx.builder_report.add_dir();
    spec_tf_ctx.set_dirs_created.insert(path_dir_dst.to_path_buf());
    Ok(true)
}

/// On unix a directory whose `(dev, ino)` is already on the ancestor stack is a
/// symlink loop and is not descended into.
fn walk_directory(
    path_root: &Path,
    spec_tf_ctx: &mut SpecTransformContext,
) -> Result<(), TransformTreeError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        let tuple_dirs_identifier = match fs::metadata(path_root) {
            Ok(stat_root) => (stat_root.dev(), stat_root.ino()),
            Err(e) => return handle_io_failure(path_root, e, spec_tf_ctx),
        };
        if !spec_tf_ctx.set_ancestor_dirs.insert(tuple_dirs_identifier) {
            spec_tf_ctx
                .builder_report
                .add_warning(format!("Symlink loop detected: {}", path_root.display()));
            return Ok(());
        }
        let result = walk_directory_entries(path_root, spec_tf_ctx);
        spec_tf_ctx.set_ancestor_dirs.remove(&tuple_dirs_identifier);
        result
    }
    #[cfg(not(unix))]
    {
        walk_directory_entries(path_root, spec_tf_ctx)
    }
}

fn walk_directory_entries(
    path_root: &Path,
    spec_tf_ctx: &mut SpecTransformContext,
) -> Result<(), TransformTreeError> {
    let path_dir_dst = derive_destination_path(
        path_root,
        &spec_tf_ctx.path_dir_src,
        &spec_tf_ctx.path_dir_dst,
    );
    if !ensure_destination_dir(&path_dir_dst, spec_tf_ctx)? {
        return Ok(());
    }

    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => return handle_io_failure(path_root, e, spec_tf_ctx),
    };

    let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
    let mut l_files: Vec<SpecFileEntry> = Vec::new();
    let enum_rule_symlink = spec_tf_ctx.spec_tf_options.rule_symlink;

    for _entry_res in iter_entries {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                handle_io_failure(path_root, e, spec_tf_ctx)?;
                continue;
            }
        };

        let path_entry = entry.path();
        let c_name = entry.file_name().to_string_lossy().to_string();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                handle_io_failure(&path_entry, e, spec_tf_ctx)?;
                continue;
            }
        };

        let (b_is_dir, b_is_file) = if cfg_file_type.is_symlink() {
            if enum_rule_symlink == EnumSymlinkStrategy::SkipSymlinks {
                spec_tf_ctx
                    .builder_report
                    .add_warning(format!("Symlink skipped: {}", path_entry.display()));
                spec_tf_ctx.builder_report.add_skipped();
                continue;
            }
            match fs::metadata(&path_entry) {
                Ok(meta_target) => (meta_target.is_dir(), meta_target.is_file()),
                Err(e) => {
                    handle_io_failure(
                        &path_entry,
                        io::Error::new(e.kind(), format!("Broken symlink ({e})")),
                        spec_tf_ctx,
                    )?;
                    continue;
                }
            }
        } else {
            (cfg_file_type.is_dir(), cfg_file_type.is_file())
        };

        if b_is_dir {
            l_dirs.push(SpecDirEntry {
                path_dir_src_sub: path_entry,
                name_dir: c_name,
            });
        } else if b_is_file {
            l_files.push(SpecFileEntry {
                path_file_src: path_entry,
                name_file: c_name,
            });
        } else {
            spec_tf_ctx
                .builder_report
                .add_warning(format!("Special file skipped: {}", path_entry.display()));
            spec_tf_ctx.builder_report.add_skipped();
        }
    }

    l_dirs.sort_by(|a, b| a.name_dir.cmp(&b.name_dir));
    l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

    if spec_tf_ctx.pats_exclude_dirs.is_some() {
        l_dirs.retain(|d| {
            let b_excluded =
                is_pattern_matching(&d.name_dir, spec_tf_ctx.pats_exclude_dirs.as_ref());
            if b_excluded {
                log::debug!("Excluded directory {}", d.path_dir_src_sub.display());
            }
            !b_excluded
        });
    }

    for _file_entry in l_files {
        handle_file_entry(_file_entry, path_root, &path_dir_dst, spec_tf_ctx)?;
    }

    for _dir_entry in l_dirs {
        walk_directory(&_dir_entry.path_dir_src_sub, spec_tf_ctx)?;
    }
    Ok(())
}

fn handle_file_entry(
    spec_file_entry: SpecFileEntry,
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_tf_ctx: &mut SpecTransformContext,
) -> Result<(), TransformTreeError> {
    spec_tf_ctx.builder_report.add_scanned();

    if !is_file_eligible(
        &spec_file_entry.name_file,
        &spec_tf_ctx.spec_tf_options.eligibility,
    ) {
        log::debug!("Skipped {}", spec_file_entry.path_file_src.display());
        return Ok(());
    }
    spec_tf_ctx.builder_report.add_matched();

    let name_file_dst = match resolve_destination_name(
        &spec_file_entry.name_file,
        &spec_tf_ctx.spec_tf_options.rules_rename,
    ) {
        Some(name_dst) => {
            spec_tf_ctx.builder_report.add_renamed();
            name_dst.to_string()
        }
        None => spec_file_entry.name_file.clone(),
    };
    let path_file_dst = path_dir_dst.join(&name_file_dst);

    let content = match fs::read_to_string(&spec_file_entry.path_file_src) {
        Ok(v) => v,
        Err(e) => return handle_io_failure(&spec_file_entry.path_file_src, e, spec_tf_ctx),
    };
    let txt = transform_text(&content, path_dir_src, &spec_tf_ctx.spec_tf_options);

    if !spec_tf_ctx.set_files_written.insert(path_file_dst.clone()) {
        spec_tf_ctx.builder_report.add_warning(format!(
            "Destination written more than once (last source wins): {} <- {}",
            path_file_dst.display(),
            spec_file_entry.path_file_src.display()
        ));
    }

    if spec_tf_ctx.spec_tf_options.if_dry_run {
        log::info!("Would copy {}", path_file_dst.display());
        spec_tf_ctx.builder_report.add_skipped();
        return Ok(());
    }

    log::info!("Copying {}", path_file_dst.display());
    let permissions = fs::metadata(&spec_file_entry.path_file_src)
        .ok()
        .map(|m| m.permissions());
    match write_text_atomic(&path_file_dst, &txt, permissions) {
        Ok(()) => {
            spec_tf_ctx.builder_report.add_copied(path_file_dst);
            Ok(())
        }
        Err(e) => handle_io_failure(&path_file_dst, e, spec_tf_ctx),
    }
}
