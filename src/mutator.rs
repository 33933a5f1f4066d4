//! Tree Mutator: inheritance injection
//!
//! The binding generator emits constructors of one fixed shape:
//!
//! ```js
//! constructor() {
//!     const ret = wasm.game_new();
//!     return ret;
//! }
//! ```
//!
//! Injection turns that into a subclass constructor:
//!
//! ```js
//! constructor() {
//!     super();
//!     const ret = wasm.game_new();
//!     this.ptr = ret;
//!     this.__postConstruct(this);   // only when post-constructible
//! }
//! ```
//!
//! The edits are positional (first and last statement). The trailing
//! statement is checked before it is removed so an unexpected shape fails
//! instead of being silently corrupted.

use oxc_allocator::{Allocator, Box as oxc_box};
use oxc_ast::ast::*;
use oxc_ast::AstBuilder;
use oxc_ast_visit::Visit;
use oxc_span::SPAN;
use serde::Serialize;

use crate::error::PatchError;
use crate::locator::{constructor_of, find_first};
use crate::rules::Conventions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchOutcome {
    /// Superclass and constructor edits were applied.
    Patched,
    /// The class already has the requested shape; nothing was touched.
    AlreadyPatched,
    /// The rule requests no structural change.
    Unchanged,
}

pub struct InheritanceInjector<'a, 'c> {
    ast: AstBuilder<'a>,
    conventions: &'c Conventions,
}

impl<'a, 'c> InheritanceInjector<'a, 'c> {
    pub fn new(allocator: &'a Allocator, conventions: &'c Conventions) -> Self {
        Self {
            ast: AstBuilder::new(allocator),
            conventions,
        }
    }

    /// Makes `class` extend `superclass`. `class_name` is used for errors only.
    pub fn inject(
        &self,
        class: &mut Class<'a>,
        class_name: &str,
        superclass: &str,
        post_constructible: bool,
    ) -> Result<PatchOutcome, PatchError> {
        let ctor_span = find_first(&*class, constructor_of(class.span))
            .ok_or_else(|| PatchError::constructor_not_found(class_name))?;

        if self.looks_patched(class, ctor_span, superclass) {
            let body = constructor_body(class, ctor_span)
                .ok_or_else(|| PatchError::constructor_not_found(class_name))?;
            if !self.has_patched_tail(&body.statements, post_constructible) {
                return Err(PatchError::shape(
                    class_name,
                    "already extends the superclass but the constructor tail does not match the rule",
                ));
            }
            tracing::info!(class = class_name, superclass, "class already patched, skipping");
            return Ok(PatchOutcome::AlreadyPatched);
        }

        let body = constructor_body(class, ctor_span)
            .ok_or_else(|| PatchError::constructor_not_found(class_name))?;
        self.check_shape(body, class_name)?;

        class.super_class = Some(self.identifier(superclass));

        let body = constructor_body_mut(class, ctor_span)
            .ok_or_else(|| PatchError::constructor_not_found(class_name))?;
        body.statements.insert(0, self.super_call());
        body.statements.pop();
        body.statements.push(self.identity_assignment());
        if post_constructible {
            body.statements.push(self.post_construct_call());
        }

        tracing::info!(
            class = class_name,
            superclass,
            post_constructible,
            "injected superclass"
        );
        Ok(PatchOutcome::Patched)
    }

    /// Precondition for the positional edits: the body declares the handle
    /// binding and its last statement returns a value built from it.
    fn check_shape(&self, body: &FunctionBody<'a>, class_name: &str) -> Result<(), PatchError> {
        let binding = self.conventions.handle_binding.as_str();

        let Some(last) = body.statements.last() else {
            return Err(PatchError::shape(class_name, "constructor body is empty"));
        };

        let Statement::ReturnStatement(ret) = last else {
            return Err(PatchError::shape(
                class_name,
                "last statement is not a return statement",
            ));
        };

        let exposes_binding = ret
            .argument
            .as_ref()
            .is_some_and(|arg| references_identifier(arg, binding));
        if !exposes_binding {
            return Err(PatchError::shape(
                class_name,
                format!("final return does not expose '{}'", binding),
            ));
        }

        if !body.statements.iter().any(|s| declares(s, binding)) {
            return Err(PatchError::shape(
                class_name,
                format!("no local binding named '{}'", binding),
            ));
        }
        Ok(())
    }

    /// Extends `superclass` and opens with `super()`: a previous run's output.
    fn looks_patched(&self, class: &Class<'a>, ctor_span: oxc_span::Span, superclass: &str) -> bool {
        let extends_target = matches!(
            &class.super_class,
            Some(Expression::Identifier(id)) if id.name.as_str() == superclass
        );
        extends_target
            && constructor_body(class, ctor_span)
                .is_some_and(|body| body.statements.first().is_some_and(is_super_call))
    }

    /// The tail this rule produces: the identity assignment, followed by the
    /// hook call only when post-constructible.
    fn has_patched_tail(&self, statements: &[Statement<'a>], post_constructible: bool) -> bool {
        match (post_constructible, statements) {
            (true, [.., assign, hook]) => {
                self.is_identity_assignment(assign) && self.is_post_construct_call(hook)
            }
            (false, [.., assign]) => self.is_identity_assignment(assign),
            _ => false,
        }
    }

    fn is_post_construct_call(&self, stmt: &Statement<'a>) -> bool {
        let Statement::ExpressionStatement(expr_stmt) = stmt else {
            return false;
        };
        let Expression::CallExpression(call) = &expr_stmt.expression else {
            return false;
        };
        let callee_is_hook = match &call.callee {
            Expression::StaticMemberExpression(member) => {
                matches!(member.object, Expression::ThisExpression(_))
                    && member.property.name.as_str() == self.conventions.post_construct_hook
            }
            _ => false,
        };
        callee_is_hook
            && call.arguments.len() == 1
            && matches!(call.arguments[0], Argument::ThisExpression(_))
    }

    fn is_identity_assignment(&self, stmt: &Statement<'a>) -> bool {
        let Statement::ExpressionStatement(expr_stmt) = stmt else {
            return false;
        };
        let Expression::AssignmentExpression(assign) = &expr_stmt.expression else {
            return false;
        };
        let target_is_field = match &assign.left {
            AssignmentTarget::StaticMemberExpression(member) => {
                matches!(member.object, Expression::ThisExpression(_))
                    && member.property.name.as_str() == self.conventions.identity_field
            }
            _ => false,
        };
        target_is_field
            && assign.operator == AssignmentOperator::Assign
            && matches!(
                &assign.right,
                Expression::Identifier(id) if id.name.as_str() == self.conventions.handle_binding
            )
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // NODE BUILDERS
    // ═══════════════════════════════════════════════════════════════════════════

    fn identifier(&self, name: &str) -> Expression<'a> {
        let name: &'a str = self.ast.allocator.alloc_str(name);
        self.ast.expression_identifier(SPAN, name)
    }

    fn this_member(&self, property: &str) -> MemberExpression<'a> {
        let property: &'a str = self.ast.allocator.alloc_str(property);
        self.ast.member_expression_static(
            SPAN,
            self.ast.expression_this(SPAN),
            self.ast.identifier_name(SPAN, property),
            false,
        )
    }

    /// `super();`
    fn super_call(&self) -> Statement<'a> {
        let call = self.ast.expression_call(
            SPAN,
            self.ast.expression_super(SPAN),
            None::<oxc_box<TSTypeParameterInstantiation>>,
            self.ast.vec(),
            false,
        );
        self.ast.statement_expression(SPAN, call)
    }

    /// `this.ptr = ret;`
    fn identity_assignment(&self) -> Statement<'a> {
        let left = SimpleAssignmentTarget::from(self.this_member(&self.conventions.identity_field));
        let assign = self.ast.expression_assignment(
            SPAN,
            AssignmentOperator::Assign,
            AssignmentTarget::from(left),
            self.identifier(&self.conventions.handle_binding),
        );
        self.ast.statement_expression(SPAN, assign)
    }

    /// `this.__postConstruct(this);`
    fn post_construct_call(&self) -> Statement<'a> {
        let callee = Expression::from(self.this_member(&self.conventions.post_construct_hook));
        let mut args = self.ast.vec();
        args.push(Argument::from(self.ast.expression_this(SPAN)));
        let call = self.ast.expression_call(
            SPAN,
            callee,
            None::<oxc_box<TSTypeParameterInstantiation>>,
            args,
            false,
        );
        self.ast.statement_expression(SPAN, call)
    }
}

fn constructor_method<'b, 'a>(class: &'b Class<'a>, span: oxc_span::Span) -> Option<&'b MethodDefinition<'a>> {
    class.body.body.iter().find_map(|element| match element {
        ClassElement::MethodDefinition(method) if method.span == span => Some(&**method),
        _ => None,
    })
}

fn constructor_body<'b, 'a>(class: &'b Class<'a>, span: oxc_span::Span) -> Option<&'b FunctionBody<'a>> {
    constructor_method(class, span)?.value.body.as_deref()
}

fn constructor_body_mut<'b, 'a>(
    class: &'b mut Class<'a>,
    span: oxc_span::Span,
) -> Option<&'b mut FunctionBody<'a>> {
    class.body.body.iter_mut().find_map(|element| match element {
        ClassElement::MethodDefinition(method) if method.span == span => {
            method.value.body.as_deref_mut()
        }
        _ => None,
    })
}

fn is_super_call(stmt: &Statement<'_>) -> bool {
    let Statement::ExpressionStatement(expr_stmt) = stmt else {
        return false;
    };
    matches!(
        &expr_stmt.expression,
        Expression::CallExpression(call)
            if matches!(call.callee, Expression::Super(_)) && call.arguments.is_empty()
    )
}

fn declares(stmt: &Statement<'_>, name: &str) -> bool {
    let Statement::VariableDeclaration(decl) = stmt else {
        return false;
    };
    decl.declarations.iter().any(|d| {
        matches!(&d.id, BindingPattern::BindingIdentifier(id) if id.name.as_str() == name)
    })
}

struct ReferenceFinder<'n> {
    name: &'n str,
    found: bool,
}

impl<'a, 'n> Visit<'a> for ReferenceFinder<'n> {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        if ident.name.as_str() == self.name {
            self.found = true;
        }
    }
}

/// True if `expr` reads `name` anywhere, e.g. `ret` or `Game.__wrap(ret)`.
fn references_identifier(expr: &Expression<'_>, name: &str) -> bool {
    let mut finder = ReferenceFinder { name, found: false };
    finder.visit_expression(expr);
    finder.found
}
