//! # Binding Patcher
//!
//! Build step that rewrites the JavaScript glue emitted by the wasm binding
//! generator so that selected classes extend a hand-written base class.
//!
//! ## Pipeline
//!
//! 1. **Load**: the rule set (`rules.rs`) and the generated source (`loader.rs`).
//! 2. **Parse**: one Oxc `Program` per run (`parse.rs`).
//! 3. **Locate**: predicate-driven depth-first search for each named class
//!    declaration and its constructor (`locator.rs`).
//! 4. **Mutate**: inheritance injection on the located class (`mutator.rs`).
//! 5. **Emit**: codegen plus a re-parse/semantic check of the result (`emit.rs`).
//! 6. **Write**: one atomic replacement of the destination (`driver.rs`).
//!
//! ## Invariants
//!
//! - A rule naming a class that does not exist aborts the run.
//! - An `extends` rule on a class without a constructor aborts the run.
//! - The constructor's trailing statement must return the handle binding
//!   before it is replaced; any other shape aborts the run.
//! - Nothing is written unless every rule applied and the output verified.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod driver;
mod emit;
mod error;
mod loader;
mod locator;
mod mutator;
mod parse;
mod rules;

#[cfg(test)]
mod locator_tests;

pub use driver::{patch_file, patch_source, ClassReport, PatchOptions, PatchReport, Stage};
pub use emit::{emit, verify_output};
pub use error::*;
pub use loader::{read_source, write_atomically};
pub use locator::{class_declaration_named, constructor_of, find_first, with_class_at, Searchable};
pub use mutator::{InheritanceInjector, PatchOutcome};
pub use parse::{parse_program, source_type_for};
pub use rules::{is_valid_identifier, ClassRule, Conventions, RuleSet};

/// Node entry point for build scripts: patches `source_path` in place and
/// returns the names of the classes that were rewritten.
#[cfg(feature = "napi")]
#[napi]
pub fn patch_bindings_native(source_path: String, rules_path: String) -> napi::Result<Vec<String>> {
    let options = PatchOptions::in_place(source_path, rules_path);
    let report = patch_file(&options)
        .map_err(|e| napi::Error::from_reason(format!("[{}] {}", e.code(), e)))?;
    Ok(report.patched_classes().map(str::to_string).collect())
}
