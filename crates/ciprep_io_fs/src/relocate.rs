//! Flat relocation of per-configuration build artifacts.
//!
//! Multi-config generators place binaries in `<bin>/<Config>/`; tests expect
//! them directly in `<bin>/`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{RelocateError, SpecRelocateOptions};
use crate::util::{copy_file_with_metadata, is_plain_file_name};

/// Copy every file in `dir_bin_root/<name_build_config>/` into `dir_bin_root/`.
///
/// Only the top level of the configuration directory is listed; nested
/// directories are reported as warnings and left in place. Files keep their
/// names, permissions and timestamps, and overwrite existing files. The first
/// failing copy aborts the run.
pub fn relocate_artifacts<P: AsRef<Path>>(
    dir_bin_root: P,
    name_build_config: &str,
    spec_rl_options: SpecRelocateOptions,
) -> Result<ReportCopy, RelocateError> {
    if !is_plain_file_name(name_build_config) {
        return Err(RelocateError::InvalidBuildConfigName(
            name_build_config.to_string(),
        ));
    }

    let path_dir_bin = dir_bin_root.as_ref().to_path_buf();
    let path_dir_config = path_dir_bin.join(name_build_config);
    match fs::metadata(&path_dir_config) {
        Ok(meta_dir_config) if meta_dir_config.is_dir() => {}
        Ok(_) => {
            return Err(RelocateError::Io {
                path: path_dir_config,
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(RelocateError::BuildDirNotFound(path_dir_config));
        }
        Err(e) => {
            return Err(RelocateError::Io {
                path: path_dir_config,
                source: e,
            });
        }
    }

    let mut l_entries = fs::read_dir(&path_dir_config)
        .and_then(|iter| iter.collect::<Result<Vec<_>, io::Error>>())
        .map_err(|e| RelocateError::Io {
            path: path_dir_config.clone(),
            source: e,
        })?;
    l_entries.sort_by_key(|entry| entry.file_name());

    let mut builder_report = ReportCopyBuilder::default();
    for entry in l_entries {
        let path_file_src = entry.path();
        builder_report.add_scanned();

        let meta_src = fs::metadata(&path_file_src).map_err(|e| RelocateError::Io {
            path: path_file_src.clone(),
            source: e,
        })?;
        if meta_src.is_dir() {
            builder_report.add_warning(format!(
                "Nested directory not relocated: {}",
                path_file_src.display()
            ));
            builder_report.add_skipped();
            continue;
        }
        if !meta_src.is_file() {
            builder_report.add_warning(format!(
                "Special file skipped: {}",
                path_file_src.display()
            ));
            builder_report.add_skipped();
            continue;
        }
        builder_report.add_matched();

        let path_file_dst: PathBuf = path_dir_bin.join(entry.file_name());
        if spec_rl_options.if_dry_run {
            log::info!("Would copy {}", path_file_dst.display());
            builder_report.add_skipped();
            continue;
        }

        log::debug!(
            "Copying {} -> {}",
            path_file_src.display(),
            path_file_dst.display()
        );
        copy_file_with_metadata(&path_file_src, &path_file_dst).map_err(|e| {
            RelocateError::Io {
                path: path_file_dst.clone(),
                source: e,
            }
        })?;
        builder_report.add_copied(path_file_dst);
    }

    Ok(builder_report.build())
}
