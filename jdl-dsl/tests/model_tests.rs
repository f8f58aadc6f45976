//! End-to-end: JDL source to a checked model.

use jdl_core::{ApplicationErrorCase, Dialect, ValidationKind, ValidationValue};
use jdl_dsl::ast::OptionKind;
use jdl_dsl::{
    compile, compile_strict, parse_node, parse_program, tokenize, AstNode, Compilation, JdlConfig,
    JdlError, ModelCompiler, ParserConfig, Rule, SemanticError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn compile_seeded(source: &str) -> Compilation {
    let program = parse_program(source).unwrap();
    ModelCompiler::default().compile_with_rng(&program, &mut StdRng::seed_from_u64(11))
}

const SHOP: &str = r#"
application {
  config {
    baseName shop
    packageName com.example.shop
    authenticationType session
    databaseType postgresql
  }
}

MAX_NAME = 64

entity Product {
  name String required maxlength(MAX_NAME),
  price BigDecimal min(0),
  currency Currency required,
  picture ImageBlob maxbytes(500000)
}

enum Currency { EUR, USD }

entity Category { title String }

relationship ManyToOne {
  Product{category(title)} to Category
}

service all with serviceImpl except Category
"#;

#[test]
fn test_valid_program_compiles_clean() {
    let compilation = compile_seeded(SHOP);
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    let model = &compilation.model;

    assert_eq!(model.dialect, Some(Dialect::Common));
    assert_eq!(model.constants.get("MAX_NAME"), Some(&64));

    let application = &model.applications[0];
    assert_eq!(application.base_name(), Some("shop"));
    assert_eq!(application.config().get_str("packageFolder"), Some("com/example/shop"));
    assert!(application.remember_me_key().is_some());
    assert!(application.jwt_secret_key().is_none());

    let product = model.entity("Product").unwrap();
    let name = product.field("name").unwrap();
    assert!(name.has(ValidationKind::Required));
    assert_eq!(
        name.validations[1].value,
        Some(ValidationValue::Integer(64))
    );
    let currency = product.field("currency").unwrap();
    assert!(currency.is_enum);
    assert!(!product.field("price").unwrap().is_enum);

    assert_eq!(model.enums[0].values, vec!["EUR", "USD"]);
    assert_eq!(model.relationships.len(), 1);
    assert_eq!(model.options.len(), 1);
    assert_eq!(model.options[0].kind, OptionKind::Service);
    assert!(model.options[0].applies_to("Product"));
    assert!(!model.options[0].applies_to("Category"));
}

#[test]
fn test_seeded_compilation_is_deterministic() {
    assert_eq!(compile_seeded(SHOP), compile_seeded(SHOP));
}

#[test]
fn test_application_database_selects_wide_column_dialect() {
    let source = "application { config { databaseType cassandra } }\n\
                  entity Event { id UUID required, label String minbytes(1), day LocalDate }";
    let compilation = compile_seeded(source);
    assert_eq!(compilation.model.dialect, Some(Dialect::WideColumn));
    assert_eq!(
        compilation.errors,
        vec![
            SemanticError::IncompatibleValidation {
                entity: "Event".into(),
                field: "label".into(),
                field_type: "String".into(),
                validation: ValidationKind::MinBytes,
                database_type: "cassandra".into(),
            },
            SemanticError::UnsupportedFieldType {
                entity: "Event".into(),
                field: "day".into(),
                field_type: "LocalDate".into(),
                database_type: "cassandra".into(),
            },
        ]
    );
    // Reported but kept.
    let label = compilation.model.entity("Event").unwrap().field("label").unwrap();
    assert!(label.has(ValidationKind::MinBytes));
}

#[test]
fn test_uuid_is_unknown_to_the_common_dialect() {
    let compilation = compile_seeded("entity A { id UUID required }");
    assert!(matches!(
        compilation.errors.as_slice(),
        [SemanticError::UnsupportedFieldType { field_type, .. }] if field_type == "UUID"
    ));
}

#[test]
fn test_duplicates_are_reported_once_each() {
    let source = "MAX = 1\nMAX = 2\n\
                  enum E { X }\nenum E { Y }\n\
                  entity A { a String, a Integer }\n\
                  entity A";
    let compilation = compile_seeded(source);
    assert_eq!(
        compilation.errors,
        vec![
            SemanticError::DuplicateConstant { name: "MAX".into() },
            SemanticError::DuplicateEnum { name: "E".into() },
            SemanticError::DuplicateField {
                entity: "A".into(),
                field: "a".into(),
            },
            SemanticError::DuplicateEntity { name: "A".into() },
        ]
    );
    let model = &compilation.model;
    assert_eq!(model.constants.get("MAX"), Some(&1));
    assert_eq!(model.enums.len(), 1);
    assert_eq!(model.entities.len(), 1);
    assert_eq!(model.entities[0].fields.len(), 1);
    assert_eq!(model.entities[0].fields[0].field_type, "String");
}

#[test]
fn test_invalid_application_is_reported_with_all_cases() {
    let source = "application { config { baseName\n buildTool } }";
    let compilation = compile_seeded(source);
    assert_eq!(
        compilation.errors,
        vec![SemanticError::InvalidApplication {
            base_name: None,
            cases: vec![ApplicationErrorCase::NoName, ApplicationErrorCase::NoBuildTool],
        }]
    );
    assert_eq!(compilation.model.applications.len(), 1);
}

#[test]
fn test_constants_may_follow_their_use() {
    let compilation = compile_seeded("entity A { n String maxlength(LEN) }\nLEN = 20");
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    let field = compilation.model.entity("A").unwrap().field("n").unwrap();
    assert_eq!(field.validations[0].value, Some(ValidationValue::Integer(20)));
}

#[test]
fn test_configured_database_type_wins() {
    let config = JdlConfig::from_toml_str("[compiler]\ndatabase_type = \"cassandra\"").unwrap();
    let source = "application { config { databaseType mysql } }\nentity A { id UUID }";
    let compilation = compile(source, &config).unwrap();
    assert_eq!(compilation.model.dialect, Some(Dialect::WideColumn));
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
}

#[test]
fn test_reduced_profile_from_config() {
    let config = JdlConfig::from_toml_str("[parser]\nprofile = \"reduced\"").unwrap();
    assert!(compile("entity A { a String, b Integer }", &config).is_ok());
    assert!(matches!(
        compile("enum E { X }", &config),
        Err(JdlError::Syntax { .. })
    ));
}

#[test]
fn test_semantic_errors_serialize_with_tag() {
    let compilation = compile_seeded("entity A { a Blob pattern(/x/) }");
    let json = serde_json::to_value(&compilation.errors).unwrap();
    assert_eq!(json[0]["error"], "incompatible_validation");
    assert_eq!(json[0]["validation"], "pattern");
}

#[test]
fn test_strict_compile_fails_on_first_semantic_error() {
    let source = "entity A { a Blob pattern(/x/), b Foo }";
    match compile_strict(source, &JdlConfig::default()) {
        Err(JdlError::Semantic(SemanticError::IncompatibleValidation { field, .. })) => {
            assert_eq!(field, "a")
        }
        other => panic!("expected a semantic error, got {:?}", other),
    }
    let model = compile_strict("entity A { a String }", &JdlConfig::default()).unwrap();
    assert_eq!(model.entities.len(), 1);
}

#[test]
fn test_strict_tokenize_reports_lexical_error() {
    match tokenize("entity A #") {
        Err(JdlError::Lex(error)) => assert_eq!((error.line, error.column), (1, 10)),
        other => panic!("expected a lex error, got {:?}", other),
    }
    assert_eq!(tokenize("entity A").unwrap().len(), 3);
}

#[test]
fn test_parse_node_builds_a_single_rule() {
    let node = parse_node(
        Rule::FieldDeclaration,
        "age Integer min(0)",
        &ParserConfig::default(),
    )
    .unwrap();
    match node {
        AstNode::Field(field) => {
            assert_eq!(field.name, "age");
            assert_eq!(field.validations.len(), 1);
        }
        other => panic!("expected a field, got {:?}", other),
    }
    assert!(matches!(
        parse_node(Rule::FieldType, "", &ParserConfig::default()),
        Err(JdlError::Syntax { .. })
    ));
}
