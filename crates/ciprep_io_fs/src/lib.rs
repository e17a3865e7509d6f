//! `ciprep_io_fs` v1:
//! filesystem passes that prepare a C/C++ tree for internal-linkage tests.
//!
//! - `transform` : mirrored tree copy with literal text substitution
//! - `relocate`  : flat build-artifact relocation
//! - `pipeline`  : pure substitution passes
//! - `conf`      : built-in preset and TOML rule sets
//! - `spec`      : enums/options/errors
//! - `report`    : run-time report model
//! - `util`      : shared helper functions

pub mod conf;
pub mod pipeline;
pub mod relocate;
pub mod report;
pub mod spec;
pub mod transform;
mod util;

pub use conf::{derive_default_transform_options, parse_transform_options, read_transform_options};
pub use pipeline::{apply_substitutions, is_eligible_directory, transform_text};
pub use relocate::relocate_artifacts;
pub use report::{ReportCopy, ReportCopyBuilder};
pub use spec::{
    EnumIoErrorStrategy, EnumPatternMode, EnumSymlinkStrategy, RelocateError, SpecCopyError,
    SpecFileEligibility, SpecRelocateOptions, SpecRenameRule, SpecSubstitution,
    SpecTransformOptions, TransformTreeError,
};
pub use transform::transform_tree;
