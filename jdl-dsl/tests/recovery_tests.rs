//! Error recovery: malformed input yields errors next to a best-effort tree.

use jdl_dsl::{
    compile, parse, parse_program, parse_program_with, AstBuilder, JdlConfig, JdlError,
    ParserConfig, Rule, SyntaxErrorKind,
};

fn entity_names(source: &str) -> Vec<String> {
    let output = parse(source);
    AstBuilder::new()
        .program(&output.cst)
        .entities()
        .map(|e| e.name.clone())
        .collect()
}

#[test]
fn test_missing_closing_brace_keeps_earlier_declarations() {
    let source = "entity A { a String required }\nentity B { b String\n";
    let output = parse(source);
    assert!(!output.errors.is_empty());
    let error = &output.errors[0];
    assert_eq!(error.kind, SyntaxErrorKind::Unexpected);
    assert_eq!(error.rule, Some(Rule::EntityBody));
    assert_eq!(error.found, "end of input");
    assert!(error.to_string().contains("in entityBody"));

    let program = AstBuilder::new().program(&output.cst);
    let entities: Vec<_> = program.entities().collect();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].name, "A");
    assert_eq!(entities[0].fields.len(), 1);
    assert_eq!(entities[0].fields[0].field_type, "String");
    assert_eq!(entities[0].fields[0].validations.len(), 1);
}

#[test]
fn test_recovered_declaration_is_flagged_in_cst() {
    let output = parse("entity A\nentity B {");
    let entities: Vec<_> = output.cst.nodes(Rule::EntityDeclaration).collect();
    assert_eq!(entities.len(), 2);
    assert!(!entities[0].has_recovered());
    assert!(entities[1].recovered);
}

#[test]
fn test_parsing_resumes_after_broken_body() {
    let source = "entity A { a String }\nentity B { b String ( }\nentity C { c Integer }";
    let output = parse(source);
    assert_eq!(output.errors.len(), 1);
    assert_eq!((output.errors[0].line, output.errors[0].column), (2, 21));
    assert_eq!(entity_names(source), vec!["A", "C"]);
}

#[test]
fn test_errors_are_ordered_by_position() {
    let source = "entity A { a }\nentity B { b }\nentity C { c String }";
    let output = parse(source);
    let lines: Vec<usize> = output.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 2]);
    assert!(output.errors.iter().all(|e| e.rule == Some(Rule::FieldType)));
    assert_eq!(entity_names(source), vec!["C"]);
}

#[test]
fn test_stray_tokens_between_declarations() {
    let source = "entity A\n42 foo\nentity B";
    let output = parse(source);
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].expected, "a declaration");
    assert_eq!(output.errors[0].found, "integer 42");
    assert_eq!(entity_names(source), vec!["A", "B"]);
}

#[test]
fn test_broken_relationship_skips_to_next_declaration() {
    let source = "relationship OneToMany { A to }\nentity B";
    let output = parse(source);
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].rule, Some(Rule::RelationshipSide));
    let program = AstBuilder::new().program(&output.cst);
    assert_eq!(program.relationships().count(), 0);
    assert_eq!(entity_names(source), vec!["B"]);
}

#[test]
fn test_unknown_application_option() {
    let source = "application { config { baseName shop bogus x } }\nentity A";
    let output = parse(source);
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].expected, "an application option or '}'");
    assert_eq!(output.errors[0].found, "identifier 'bogus'");
    let program = AstBuilder::new().program(&output.cst);
    assert_eq!(program.applications().count(), 0);
    assert_eq!(entity_names(source), vec!["A"]);
}

#[test]
fn test_lexical_errors_do_not_stop_parsing() {
    let source = "entity A { a String # }\nentity B";
    let output = parse(source);
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].kind, SyntaxErrorKind::Lexical);
    assert_eq!((output.errors[0].line, output.errors[0].column), (1, 21));
    assert_eq!(entity_names(source), vec!["A", "B"]);
}

#[test]
fn test_unterminated_block_comment() {
    let output = parse("entity A\n/* never closed");
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].kind, SyntaxErrorKind::Lexical);
    assert_eq!(output.cst.nodes(Rule::EntityDeclaration).count(), 1);
}

#[test]
fn test_strict_entry_points_fail_on_syntax_errors() {
    let source = "entity A { a }\nentity B { b }";
    match parse_program(source) {
        Err(JdlError::Syntax { errors }) => assert_eq!(errors.len(), 2),
        other => panic!("expected syntax errors, got {:?}", other),
    }
    assert!(matches!(
        compile(source, &JdlConfig::default()),
        Err(JdlError::Syntax { .. })
    ));
}

#[test]
fn test_without_recovery_reports_only_the_first_error() {
    let config = ParserConfig::default().without_recovery();
    match parse_program_with("entity A { a }\nentity B { b }", &config) {
        Err(JdlError::Syntax { errors }) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].line, 1);
        }
        other => panic!("expected syntax errors, got {:?}", other),
    }
}

#[test]
fn test_unclosed_entity_body_keeps_following_declarations() {
    let source = "entity A { a String\n\
                  entity B { b String }\n\
                  enum Color { RED, BLUE }\n\
                  relationship OneToMany { B to D }\n\
                  service B with serviceClass\n\
                  entity C";
    let output = parse(source);
    assert_eq!(output.errors.len(), 1);
    let error = &output.errors[0];
    assert_eq!(error.rule, Some(Rule::EntityBody));
    assert_eq!((error.line, error.column), (2, 1));
    assert_eq!(error.found, "'entity'");

    let a = output.cst.node(Rule::EntityDeclaration).unwrap();
    assert!(a.has_recovered());
    let body = a.node(Rule::EntityBody).unwrap();
    assert_eq!(body.nodes(Rule::FieldDeclaration).count(), 1);

    let program = AstBuilder::new().program(&output.cst);
    let entities: Vec<&str> = program.entities().map(|e| e.name.as_str()).collect();
    assert_eq!(entities, vec!["B", "C"]);
    assert_eq!(program.enums().next().unwrap().name, "Color");
    assert_eq!(program.relationships().count(), 1);
    assert_eq!(program.options().count(), 1);
}

#[test]
fn test_unclosed_entity_body_before_each_declaration_kind() {
    for next in [
        "entity B (b_table) { b String }",
        "enum B { X }",
        "relationship ManyToMany { A to B }",
        "application { config { baseName b } }",
        "dto * with mapstruct",
        "paginate A with pager",
        "skipClient for A",
        "filter all except A",
    ] {
        let source = format!("entity A {{ a String required\n{}", next);
        let output = parse(&source);
        assert_eq!(output.errors.len(), 1, "{}: {:?}", next, output.errors);
        assert_eq!((output.errors[0].line, output.errors[0].column), (2, 1), "{}", next);
        let program = AstBuilder::new().program(&output.cst);
        assert_eq!(program.declarations.len(), 1, "{}", next);
    }
}

#[test]
fn test_unclosed_entity_body_in_reduced_profile() {
    let config = ParserConfig::reduced();
    let output = jdl_dsl::JdlParser::new(config).parse("entity A { a String,\nentity B { b String }");
    assert_eq!(output.errors.len(), 1);
    assert_eq!((output.errors[0].line, output.errors[0].column), (2, 1));
    let program = AstBuilder::new().program(&output.cst);
    let entities: Vec<&str> = program.entities().map(|e| e.name.as_str()).collect();
    assert_eq!(entities, vec!["B"]);
}
