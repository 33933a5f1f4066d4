//! Emitter
//!
//! Serializes the patched program and checks the result before anything is
//! written: the text must parse again and pass Oxc's semantic syntax checks
//! (which reject, among others, `super()` in a class without a superclass).

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use std::path::Path;

use crate::error::PatchError;
use crate::parse::source_type_for;

pub fn emit(program: &Program<'_>) -> String {
    Codegen::new().build(program).code
}

pub fn verify_output(code: &str, path: &Path) -> Result<(), PatchError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type_for(path)).parse();

    let mut messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
    if ret.panicked && messages.is_empty() {
        messages.push("parser aborted".to_string());
    }

    if messages.is_empty() {
        let semantic = SemanticBuilder::new()
            .with_check_syntax_error(true)
            .build(&ret.program);
        messages.extend(semantic.errors.iter().map(|e| e.to_string()));
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(PatchError::InvalidOutput {
            file: path.display().to_string(),
            messages,
        })
    }
}
