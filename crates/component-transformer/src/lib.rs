//! Code generation from parsed components to framework sources.
//!
//! This crate turns a component parsed by `component_parser` into:
//! - A React function component with hooks and JSX
//! - A Vue single-file component using `<script setup>`
//! - A Svelte component
//! - A framework-free module rendering with the DOM API
//!
//! Generation never fails. Problems are reported as diagnostics next to the
//! generated code, and unusable input produces a small error component.
//!
//! # Example
//!
//! ```
//! use component_transformer::{transform, Target, TransformOptions};
//!
//! let source = r#"
//! $count! = 0
//! $increment = () => { $count++ }
//!
//! <template>
//!   <button click={$increment}>{$count}</button>
//! </template>
//! "#;
//!
//! let result = transform(source, Target::React, TransformOptions::default());
//! assert!(result.is_ok());
//! assert!(result.code.contains("useState(0)"));
//! ```

mod batch;
mod code;
mod error;
mod expr;
mod naming;
mod scope;
mod strategy;
mod target;
mod targets;
mod transform;

pub use batch::{transform_batch, SourceFile};
pub use error::{SemanticWarningKind, TransformErrorKind};
pub use expr::{ExprContext, WriteOp};
pub use naming::FALLBACK_COMPONENT_NAME;
pub use scope::{Scope, StateKind};
pub use strategy::{
    AttributeValue, CodeGenStrategy, ComponentParts, Flow, FunctionCode, Handler, VariableCode,
};
pub use target::Target;
pub use targets::{strategy_for, React, Svelte, Vanilla, Vue};
pub use transform::{
    transform, transform_named, transform_parsed, TransformOptions, TransformResult,
    DEFAULT_SIGNAL_MODULE,
};
