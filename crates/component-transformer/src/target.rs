//! Supported output frameworks.

use crate::error::TransformErrorKind;
use std::fmt;
use std::str::FromStr;

/// A code generation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Target {
    /// A React function component using hooks and JSX.
    React,
    /// A Vue single-file component with `<script setup>`.
    Vue,
    /// A Svelte component.
    Svelte,
    /// A plain DOM module without a framework runtime.
    Vanilla,
}

impl Target {
    /// Every target, in documentation order.
    pub const ALL: [Target; 4] = [Target::React, Target::Vue, Target::Svelte, Target::Vanilla];

    /// Returns the target id as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::React => "react",
            Target::Vue => "vue",
            Target::Svelte => "svelte",
            Target::Vanilla => "vanilla",
        }
    }

    /// Returns the file extension of generated code, without the dot.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Target::React => "jsx",
            Target::Vue => "vue",
            Target::Svelte => "svelte",
            Target::Vanilla => "js",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = TransformErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        Target::ALL
            .into_iter()
            .find(|target| target.as_str().eq_ignore_ascii_case(id))
            .ok_or_else(|| TransformErrorKind::UnknownTarget {
                name: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!("react".parse::<Target>(), Ok(Target::React));
        assert_eq!(" Vue ".parse::<Target>(), Ok(Target::Vue));
        assert_eq!(
            "angular".parse::<Target>(),
            Err(TransformErrorKind::UnknownTarget {
                name: "angular".to_string()
            })
        );
    }

    #[test]
    fn test_display_round_trips() {
        for target in Target::ALL {
            assert_eq!(target.to_string().parse::<Target>(), Ok(target));
        }
    }

    #[test]
    fn test_file_extension() {
        let extensions: Vec<_> = Target::ALL.iter().map(Target::file_extension).collect();
        assert_eq!(extensions, vec!["jsx", "vue", "svelte", "js"]);
    }
}
