//! Node Locator
//!
//! Predicate-driven depth-first search over the Oxc AST. Every node reached by
//! `oxc_ast_visit::Visit` is presented to the predicate as an `AstKind`
//! together with its ancestor chain, so predicates can be structural
//! ("a constructor whose nearest class is X") as well as nominal.
//!
//! Search is read-only and returns the span of the first match. Spans of
//! parsed nodes are unique per node kind, which lets `with_class_at` re-enter
//! the tree mutably afterwards.

use oxc_ast::ast::{Class, ClassType, MethodDefinitionKind, Program};
use oxc_ast::AstKind;
use oxc_ast_visit::walk_mut::walk_class;
use oxc_ast_visit::{Visit, VisitMut};
use oxc_span::{GetSpan, Span};

/// A subtree the locator can search.
pub trait Searchable<'a> {
    fn accept<V: Visit<'a>>(&self, visitor: &mut V);
}

impl<'a> Searchable<'a> for Program<'a> {
    fn accept<V: Visit<'a>>(&self, visitor: &mut V) {
        visitor.visit_program(self);
    }
}

impl<'a> Searchable<'a> for Class<'a> {
    fn accept<V: Visit<'a>>(&self, visitor: &mut V) {
        visitor.visit_class(self);
    }
}

struct Finder<'a, P> {
    predicate: P,
    ancestors: Vec<AstKind<'a>>,
    found: Option<Span>,
}

impl<'a, P> Visit<'a> for Finder<'a, P>
where
    P: FnMut(&AstKind<'a>, &[AstKind<'a>]) -> bool,
{
    // Visit has no early exit, so the walk always covers the whole root.
    // Only the first match is recorded; the predicate is not called after it.
    fn enter_node(&mut self, kind: AstKind<'a>) {
        if self.found.is_none() && (self.predicate)(&kind, &self.ancestors) {
            self.found = Some(kind.span());
        }
        self.ancestors.push(kind);
    }

    fn leave_node(&mut self, _kind: AstKind<'a>) {
        self.ancestors.pop();
    }
}

/// Returns the span of the first node, in depth-first pre-order, that
/// satisfies `predicate`. The predicate sees the node and its ancestors
/// (outermost first, the node itself excluded).
pub fn find_first<'a, S, P>(root: &S, predicate: P) -> Option<Span>
where
    S: Searchable<'a> + ?Sized,
    P: FnMut(&AstKind<'a>, &[AstKind<'a>]) -> bool,
{
    let mut finder = Finder {
        predicate,
        ancestors: Vec::new(),
        found: None,
    };
    root.accept(&mut finder);
    finder.found
}

/// Matches a class declaration (exported or not) named `name`. Class
/// expressions bound to a variable of that name do not match.
pub fn class_declaration_named<'a>(
    name: &str,
) -> impl Fn(&AstKind<'a>, &[AstKind<'a>]) -> bool + '_ {
    move |kind, _| match kind {
        AstKind::Class(class) => {
            class.r#type == ClassType::ClassDeclaration
                && class.id.as_ref().is_some_and(|id| id.name.as_str() == name)
        }
        _ => false,
    }
}

/// Matches the constructor member of the class at `class_span`, by role.
/// Constructors of nested classes have a different nearest class and are
/// skipped.
pub fn constructor_of<'a>(class_span: Span) -> impl Fn(&AstKind<'a>, &[AstKind<'a>]) -> bool {
    move |kind, ancestors| match kind {
        AstKind::MethodDefinition(method) if method.kind == MethodDefinitionKind::Constructor => {
            nearest_class(ancestors) == Some(class_span)
        }
        _ => false,
    }
}

fn nearest_class(ancestors: &[AstKind<'_>]) -> Option<Span> {
    ancestors.iter().rev().find_map(|kind| match kind {
        AstKind::Class(class) => Some(class.span),
        _ => None,
    })
}

struct ClassAt<F, R> {
    span: Span,
    edit: Option<F>,
    result: Option<R>,
}

impl<'a, F, R> VisitMut<'a> for ClassAt<F, R>
where
    F: FnOnce(&mut Class<'a>) -> R,
{
    fn visit_class(&mut self, class: &mut Class<'a>) {
        if class.span == self.span {
            if let Some(edit) = self.edit.take() {
                self.result = Some(edit(class));
                return;
            }
        }
        walk_class(self, class);
    }
}

/// Runs `edit` on the class whose span is `span`. Returns `None` if no such
/// class exists.
pub fn with_class_at<'a, F, R>(program: &mut Program<'a>, span: Span, edit: F) -> Option<R>
where
    F: FnOnce(&mut Class<'a>) -> R,
{
    let mut visitor = ClassAt {
        span,
        edit: Some(edit),
        result: None,
    };
    visitor.visit_program(program);
    visitor.result
}
