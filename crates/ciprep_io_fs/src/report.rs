//! Run report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecCopyError;

/// Aggregate counters and diagnostics for one `transform_tree` or
/// `relocate_artifacts` run.
#[derive(Debug, Default, Clone)]
pub struct ReportCopy {
    /// Total scanned file entries.
    pub cnt_scanned: u64,
    /// Number of scanned files that passed eligibility.
    pub cnt_matched: u64,
    /// Number of files written to the destination.
    pub cnt_copied: u64,
    /// Number of written files whose name was changed by a rename rule.
    pub cnt_renamed: u64,
    /// Number of entries skipped by strategy or dry-run.
    pub cnt_skipped: u64,
    /// Number of destination directories created (or confirmed) this run.
    pub cnt_dirs: u64,
    /// Destination paths in write order.
    pub paths_copied: Vec<PathBuf>,
    /// Non-fatal warnings collected during traversal/copy.
    pub warnings: Vec<String>,
    /// Per-entry failures (only populated in report mode).
    pub errors: Vec<SpecCopyError>,
}

impl ReportCopy {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_renamed".to_string(), self.cnt_renamed);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_dirs".to_string(), self.cnt_dirs);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} scanned={} matched={} copied={} renamed={} skipped={} dirs={} errors={} warnings={}",
            dict_counts["cnt_scanned"],
            dict_counts["cnt_matched"],
            dict_counts["cnt_copied"],
            dict_counts["cnt_renamed"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_dirs"],
            dict_counts["cnt_errors"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[INFO]"))
    }
}

/// Mutable accumulator for run statistics.
///
/// Warnings and errors are mirrored to the `log` facade as they arrive so
/// progress output stays in step with the walk.
#[derive(Debug, Default, Clone)]
pub struct ReportCopyBuilder {
    /// See [`ReportCopy::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportCopy::cnt_matched`].
    pub cnt_matched: u64,
    /// See [`ReportCopy::cnt_copied`].
    pub cnt_copied: u64,
    /// See [`ReportCopy::cnt_renamed`].
    pub cnt_renamed: u64,
    /// See [`ReportCopy::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportCopy::cnt_dirs`].
    pub cnt_dirs: u64,
    /// See [`ReportCopy::paths_copied`].
    pub paths_copied: Vec<PathBuf>,
    /// See [`ReportCopy::errors`].
    pub errors: Vec<SpecCopyError>,
    /// See [`ReportCopy::warnings`].
    pub warnings: Vec<String>,
}

impl ReportCopyBuilder {
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    pub fn add_matched(&mut self) {
        self.cnt_matched += 1;
    }

    pub fn add_renamed(&mut self) {
        self.cnt_renamed += 1;
    }

    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    pub fn add_dir(&mut self) {
        self.cnt_dirs += 1;
    }

    /// Record one committed destination file.
    pub fn add_copied(&mut self, path_dst: PathBuf) {
        self.cnt_copied += 1;
        self.paths_copied.push(path_dst);
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        log::error!("{}: {exception}", path.display());
        self.errors.push(SpecCopyError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportCopy {
        ReportCopy {
            cnt_scanned: self.cnt_scanned,
            cnt_matched: self.cnt_matched,
            cnt_copied: self.cnt_copied,
            cnt_renamed: self.cnt_renamed,
            cnt_skipped: self.cnt_skipped,
            cnt_dirs: self.cnt_dirs,
            paths_copied: self.paths_copied,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ReportCopy, ReportCopyBuilder};

    #[test]
    fn report_copy_to_dict_and_format_line() {
        let report = ReportCopy {
            cnt_scanned: 8,
            cnt_matched: 5,
            cnt_copied: 4,
            cnt_renamed: 1,
            cnt_skipped: 2,
            cnt_dirs: 3,
            paths_copied: vec![],
            warnings: vec!["w".to_string()],
            errors: vec![],
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_matched"], 5);
        assert_eq!(dict_counts["cnt_copied"], 4);
        assert_eq!(dict_counts["cnt_errors"], 0);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[INFO]");
        assert_eq!(
            txt,
            "[INFO] scanned=8 matched=5 copied=4 renamed=1 skipped=2 dirs=3 errors=0 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn builder_keeps_copied_paths_in_order() {
        let mut builder = ReportCopyBuilder::default();
        builder.add_copied(PathBuf::from("b.c"));
        builder.add_copied(PathBuf::from("a.c"));
        builder.add_error(PathBuf::from("x.c"), "denied".to_string());

        let report = builder.build();
        assert_eq!(report.cnt_copied, 2);
        assert_eq!(
            report.paths_copied,
            vec![PathBuf::from("b.c"), PathBuf::from("a.c")]
        );
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors[0].exception, "denied");
    }
}
