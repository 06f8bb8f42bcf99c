//! Parallel compilation of independent files.

use crate::target::Target;
use crate::transform::{transform, TransformOptions, TransformResult};
use rayon::prelude::*;
use tracing::debug_span;

/// One source file to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// The file name, used for diagnostics and the component name.
    pub filename: String,
    /// The component source.
    pub source: String,
}

impl SourceFile {
    /// Creates a source file.
    pub fn new(filename: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            source: source.into(),
        }
    }
}

/// Compiles every file for `target`, preserving input order.
///
/// Each file's name replaces `options.filename`.
pub fn transform_batch(
    files: &[SourceFile],
    target: Target,
    options: &TransformOptions,
) -> Vec<TransformResult> {
    let span = debug_span!("transform_batch", %target, files = files.len());
    let _guard = span.enter();

    files
        .par_iter()
        .map(|file| {
            let options = options.clone().with_filename(file.filename.clone());
            transform(&file.source, target, options)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_results_keep_input_order() {
        let files: Vec<SourceFile> = (0..16)
            .map(|i| {
                SourceFile::new(
                    format!("widget-{i}.component"),
                    format!("$value! = {i}\n<template><p>{{$value}}</p></template>"),
                )
            })
            .collect();
        let results = transform_batch(&files, Target::Svelte, &TransformOptions::default());
        assert_eq!(results.len(), files.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.component_name, format!("Widget{i}"));
            assert!(result.code.contains(&format!("let value = {i};")));
            assert!(result.is_ok());
        }
    }
}
