#[cfg(test)]
mod tests {
    use crate::locator::{class_declaration_named, constructor_of, find_first, with_class_at};
    use crate::parse::parse_program;
    use oxc_allocator::Allocator;
    use oxc_ast::ast::{Class, MethodDefinitionKind, Statement};
    use oxc_ast::AstKind;
    use std::path::Path;

    const BINDINGS: &str = r#"
        import * as wasm from './game_bg.wasm';

        export class Game {
            constructor() {
                const ret = wasm.game_new();
                return ret;
            }
            run() { wasm.game_run(this.ptr); }
        }

        class Renderer {
            static Frame = class Frame {
                constructor() { this.index = 0; }
            };
            constructor() {
                const ret = wasm.renderer_new();
                return ret;
            }
        }

        function makeLogic() {
            class Logic {
                tick() {}
            }
            return new Logic();
        }

        const Alias = class Alias {};
    "#;

    fn top_level_class<'b, 'a>(statements: &'b [Statement<'a>], name: &str) -> &'b Class<'a> {
        statements
            .iter()
            .find_map(|stmt| match stmt {
                Statement::ClassDeclaration(class)
                    if class.id.as_ref().is_some_and(|id| id.name.as_str() == name) =>
                {
                    Some(&**class)
                }
                _ => None,
            })
            .expect("top-level class")
    }

    #[test]
    fn test_finds_exported_class_declaration() {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, BINDINGS, Path::new("game.js")).unwrap();

        let span = find_first(&program, class_declaration_named("Game")).expect("Game");
        let text = &BINDINGS[span.start as usize..span.end as usize];
        assert!(text.starts_with("class Game"), "got: {}", text);
    }

    #[test]
    fn test_finds_class_nested_in_function() {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, BINDINGS, Path::new("game.js")).unwrap();

        let span = find_first(&program, class_declaration_named("Logic")).expect("Logic");
        assert!(BINDINGS[span.start as usize..].starts_with("class Logic"));
    }

    #[test]
    fn test_class_expressions_and_missing_names_do_not_match() {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, BINDINGS, Path::new("game.js")).unwrap();

        assert!(find_first(&program, class_declaration_named("Alias")).is_none());
        assert!(find_first(&program, class_declaration_named("Frame")).is_none());
        assert!(find_first(&program, class_declaration_named("Missing")).is_none());
    }

    #[test]
    fn test_repeated_lookups_are_deterministic() {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, BINDINGS, Path::new("game.js")).unwrap();

        for name in ["Game", "Renderer", "Logic", "Missing"] {
            let first = find_first(&program, class_declaration_named(name));
            let second = find_first(&program, class_declaration_named(name));
            assert_eq!(first, second, "lookup of {} changed between searches", name);
        }
    }

    #[test]
    fn test_constructor_of_skips_nested_class_constructor() {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, BINDINGS, Path::new("game.js")).unwrap();
        let renderer = find_first(&program, class_declaration_named("Renderer")).unwrap();

        // Plain role search from the class hits Frame's constructor first.
        let class = top_level_class(&program.body, "Renderer");
        let any_ctor = find_first(class, |kind, _| {
            matches!(kind, AstKind::MethodDefinition(m) if m.kind == MethodDefinitionKind::Constructor)
        })
        .unwrap();
        assert!(BINDINGS[any_ctor.start as usize..].starts_with("constructor() { this.index"));

        let own_ctor = find_first(class, constructor_of(renderer)).expect("Renderer constructor");
        assert_ne!(own_ctor, any_ctor);
        assert!(BINDINGS[own_ctor.start as usize..own_ctor.end as usize].contains("wasm.renderer_new()"));

        // Same answer when searching from the program root.
        assert_eq!(find_first(&program, constructor_of(renderer)), Some(own_ctor));
    }

    #[test]
    fn test_class_without_constructor() {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, BINDINGS, Path::new("game.js")).unwrap();
        let logic = find_first(&program, class_declaration_named("Logic")).unwrap();

        assert!(find_first(&program, constructor_of(logic)).is_none());
    }

    #[test]
    fn test_with_class_at_reaches_located_class() {
        let allocator = Allocator::default();
        let mut program = parse_program(&allocator, BINDINGS, Path::new("game.js")).unwrap();
        let span = find_first(&program, class_declaration_named("Logic")).unwrap();

        let name = with_class_at(&mut program, span, |class| {
            class.id.as_ref().map(|id| id.name.to_string())
        });
        assert_eq!(name, Some(Some("Logic".to_string())));

        let stale = oxc_span::Span::new(0, 1);
        assert!(with_class_at(&mut program, stale, |_| ()).is_none());
    }
}
