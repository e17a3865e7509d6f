use anyhow::{Context, Result, bail};
use ciprep_io_fs::conf::TUP_BUILD_CONFIG_NAMES;
use ciprep_io_fs::{
    EnumIoErrorStrategy, ReportCopy, SpecRelocateOptions, derive_default_transform_options,
    read_transform_options, relocate_artifacts, transform_tree,
};

use crate::args::{ArgsPrepare, ArgsRelocate, resolve_project_root};

/// Run the source-tree transform and return its report.
///
/// Per-file failures collected under `--keep-going` still fail the command.
pub fn run_prepare(args: &ArgsPrepare) -> Result<ReportCopy> {
    let path_project_root = resolve_project_root(args.project_root.as_deref())
        .context("Failed to resolve project root")?;
    let path_dir_src = args.path_source(&path_project_root);
    let path_dir_dst = args.path_destination(&path_project_root);

    let mut spec_tf_options = match &args.config {
        Some(path_config) => read_transform_options(path_config)?,
        None => derive_default_transform_options(),
    };
    spec_tf_options.if_dry_run |= args.dry_run;
    if args.keep_going {
        spec_tf_options.rule_io_error = EnumIoErrorStrategy::Report;
    }

    let report = transform_tree(&path_dir_src, &path_dir_dst, spec_tf_options)
        .with_context(|| format!("Failed to prepare {}", path_dir_dst.display()))?;

    println!();
    println!("{report}");
    if report.error_count() > 0 {
        bail!(
            "{} file(s) could not be transformed; first failure: {}: {}",
            report.error_count(),
            report.errors[0].path.display(),
            report.errors[0].exception
        );
    }
    Ok(report)
}

/// Relocate one build configuration's artifacts and print the numbered listing.
pub fn run_relocate(args: &ArgsRelocate) -> Result<ReportCopy> {
    let path_project_root = resolve_project_root(args.project_root.as_deref())
        .context("Failed to resolve project root")?;
    let path_dir_bin = args.path_bin_dir(&path_project_root);

    if !TUP_BUILD_CONFIG_NAMES.contains(&args.build_type.as_str()) {
        log::warn!(
            "Unrecognized build configuration {:?} (expected one of {})",
            args.build_type,
            TUP_BUILD_CONFIG_NAMES.join(", ")
        );
    }

    let report = relocate_artifacts(
        &path_dir_bin,
        &args.build_type,
        SpecRelocateOptions {
            if_dry_run: args.dry_run,
        },
    )
    .with_context(|| format!("Failed to relocate {} artifacts", args.build_type))?;

    if args.dry_run {
        println!(
            "Dry run: {} file(s) would be copied, nothing was written.",
            report.cnt_matched
        );
        return Ok(report);
    }

    println!("Copied the following files:");
    println!();
    for (idx, path_file) in report.paths_copied.iter().enumerate() {
        let name_file = path_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        println!("    {}: {name_file}", idx + 1);
    }
    Ok(report)
}
