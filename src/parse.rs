//! Parse Module for the binding patcher
//!
//! Wraps the Oxc parser. The generated glue is an ES module; TypeScript
//! declarations are accepted when the path says so.

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::Path;

use crate::error::PatchError;

pub fn source_type_for(path: &Path) -> SourceType {
    let is_typescript = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("ts" | "mts" | "cts")
    );
    SourceType::default()
        .with_module(true)
        .with_typescript(is_typescript)
}

/// Parses `source` into an arena-allocated program. Any diagnostic is fatal;
/// the patcher never works on a recovered tree.
pub fn parse_program<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    path: &Path,
) -> Result<Program<'a>, PatchError> {
    let ret = Parser::new(allocator, source, source_type_for(path)).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let mut messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        if messages.is_empty() {
            messages.push("parser aborted".to_string());
        }
        return Err(PatchError::Parse {
            file: path.display().to_string(),
            messages,
        });
    }

    tracing::debug!(
        file = %path.display(),
        statements = ret.program.body.len(),
        "parsed source"
    );
    Ok(ret.program)
}
