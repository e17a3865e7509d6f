//! Literal text substitution passes.
//!
//! Every pass is a plain `str::replace` over the whole file content; nothing
//! here knows about C/C++ tokens. Order matters: each step sees the output of
//! the previous one.

use std::path::Path;

use crate::spec::{SpecSubstitution, SpecTransformOptions, TransformTreeError};

/// Apply `rules` in list order.
pub fn apply_substitutions(text: &str, rules: &[SpecSubstitution]) -> String {
    rules.iter().fold(text.to_string(), |acc, rule| {
        if acc.contains(&rule.pattern) {
            acc.replace(&rule.pattern, &rule.replacement)
        } else {
            acc
        }
    })
}

/// Whether the containing source directory receives the conditional pass.
///
/// The check is a suffix test on the directory path text, so `compiler`
/// matches both `src/compiler` and `src/mycompiler`.
pub fn is_eligible_directory(path_dir_src: &Path, dirs_eligible: &[String]) -> bool {
    if dirs_eligible.is_empty() {
        return false;
    }
    let c_path = path_dir_src.to_string_lossy();
    let c_path = c_path.trim_end_matches(['/', '\\']);
    dirs_eligible
        .iter()
        .any(|name| !name.is_empty() && c_path.ends_with(name.as_str()))
}

/// Run the unconditional, conditional and trailing passes on one file body.
pub fn transform_text(
    content: &str,
    path_dir_src: &Path,
    spec_tf_options: &SpecTransformOptions,
) -> String {
    let mut txt = apply_substitutions(content, &spec_tf_options.substitutions);
    if is_eligible_directory(path_dir_src, &spec_tf_options.dirs_eligible) {
        txt = apply_substitutions(&txt, &spec_tf_options.substitutions_conditional);
    }
    apply_substitutions(&txt, &spec_tf_options.substitutions_trailing)
}

/// Reject steps that `str::replace` would not treat literally.
///
/// An empty pattern matches between every character, which would splice the
/// replacement through the whole file.
pub(crate) fn validate_substitutions(
    spec_tf_options: &SpecTransformOptions,
) -> Result<(), TransformTreeError> {
    let l_pipelines = [
        ("substitutions", &spec_tf_options.substitutions),
        (
            "substitutions_conditional",
            &spec_tf_options.substitutions_conditional,
        ),
        (
            "substitutions_trailing",
            &spec_tf_options.substitutions_trailing,
        ),
    ];
    for (name_pipeline, rules) in l_pipelines {
        if let Some(idx) = rules.iter().position(|r| r.pattern.is_empty()) {
            return Err(TransformTreeError::InvalidSubstitution(format!(
                "Empty pattern in `{name_pipeline}` at step {idx}."
            )));
        }
    }
    Ok(())
}
