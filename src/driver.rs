//! Transformation Driver
//!
//! Runs the whole patch as one all-or-nothing pass:
//!
//! `Loaded -> Parsed -> RuleApplied(1..=n) -> Emitted -> Written`
//!
//! The allocator and the program are owned here; locator and mutator only
//! borrow them. The destination is written once, after every rule has been
//! applied and the emitted text has been verified.

use oxc_allocator::Allocator;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::emit::{emit, verify_output};
use crate::error::PatchError;
use crate::loader::{read_source, write_atomically};
use crate::locator::{class_declaration_named, find_first, with_class_at};
use crate::mutator::{InheritanceInjector, PatchOutcome};
use crate::parse::parse_program;
use crate::rules::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Parsed,
    RuleApplied(usize),
    Emitted,
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Loaded => write!(f, "loaded"),
            Stage::Parsed => write!(f, "parsed"),
            Stage::RuleApplied(i) => write!(f, "rule {} applied", i),
            Stage::Emitted => write!(f, "emitted"),
            Stage::Written => write!(f, "written"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassReport {
    pub name: String,
    pub outcome: PatchOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchReport {
    pub code: String,
    pub classes: Vec<ClassReport>,
}

impl PatchReport {
    pub fn patched_classes(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .filter(|c| c.outcome == PatchOutcome::Patched)
            .map(|c| c.name.as_str())
    }

    pub fn outcome_of(&self, class: &str) -> Option<PatchOutcome> {
        self.classes
            .iter()
            .find(|c| c.name == class)
            .map(|c| c.outcome)
    }
}

#[derive(Debug, Clone)]
pub struct PatchOptions {
    pub source: PathBuf,
    pub rules: PathBuf,
    /// Destination; the source file itself when `None`.
    pub output: Option<PathBuf>,
    /// Run everything but the write.
    pub dry_run: bool,
}

impl PatchOptions {
    pub fn in_place(source: impl Into<PathBuf>, rules: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            rules: rules.into(),
            output: None,
            dry_run: false,
        }
    }

    pub fn destination(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.source)
    }
}

fn enter(stage: Stage) {
    tracing::debug!(%stage, "stage");
}

/// Applies `rules` to `source` in memory. `path` names the source in errors
/// and selects the source type.
pub fn patch_source(source: &str, path: &Path, rules: &RuleSet) -> Result<PatchReport, PatchError> {
    let allocator = Allocator::default();
    let mut program = parse_program(&allocator, source, path)?;
    enter(Stage::Parsed);

    let injector = InheritanceInjector::new(&allocator, &rules.conventions);
    let mut classes = Vec::with_capacity(rules.class_declarations.len());

    for (index, (name, rule)) in rules.class_declarations.iter().enumerate() {
        let span = find_first(&program, class_declaration_named(name))
            .ok_or_else(|| PatchError::class_not_found(name))?;

        let outcome = match &rule.extends {
            Some(superclass) => with_class_at(&mut program, span, |class| {
                injector.inject(class, name, superclass, rule.post_constructible)
            })
            .ok_or_else(|| PatchError::class_not_found(name))??,
            None => {
                if rule.post_constructible {
                    tracing::warn!(
                        class = name.as_str(),
                        "postConstructible has no effect without extends"
                    );
                }
                PatchOutcome::Unchanged
            }
        };

        classes.push(ClassReport {
            name: name.clone(),
            outcome,
        });
        enter(Stage::RuleApplied(index + 1));
    }

    let code = emit(&program);
    verify_output(&code, path)?;
    enter(Stage::Emitted);

    Ok(PatchReport { code, classes })
}

/// Loads rules and source, patches, and writes the result unless this is a
/// dry run. On error the destination is never touched.
pub fn patch_file(options: &PatchOptions) -> Result<PatchReport, PatchError> {
    let _span = tracing::info_span!("patch", file = %options.source.display()).entered();

    let rules = RuleSet::load(&options.rules)?;
    let source = read_source(&options.source)?;
    enter(Stage::Loaded);

    let report = patch_source(&source, &options.source, &rules)?;

    if options.dry_run {
        tracing::info!("dry run, nothing written");
        return Ok(report);
    }

    let destination = options.destination();
    write_atomically(destination, &report.code)?;
    enter(Stage::Written);

    tracing::info!(
        output = %destination.display(),
        patched = report.patched_classes().count(),
        rules = report.classes.len(),
        "bindings patched"
    );
    Ok(report)
}
