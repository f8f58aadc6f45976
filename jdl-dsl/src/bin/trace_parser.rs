/// JDL Tracer - Shows the flow through Lexer → Parser → CST → AST → Model
///
/// Usage: cargo run --bin trace_parser <jdl-file> [--rule <rule>] [--config <toml>]
///
/// Set RUST_LOG (default `jdl_dsl=debug,info`) to see recovery and compiler events.

use jdl_dsl::parser::{CstElement, CstNode};
use jdl_dsl::{AstBuilder, AstNode, JdlConfig, JdlParser, Lexer, ModelCompiler, Rule, TokenKind};
use std::fs;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin trace_parser <jdl-file> [--rule <rule>] [--config <toml>]");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  cargo run --bin trace_parser model.jdl");
    eprintln!("  cargo run --bin trace_parser field.jdl --rule fieldDeclaration");
    std::process::exit(1);
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jdl_dsl=debug,info"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn print_cst(node: &CstNode, depth: usize) {
    let marker = if node.recovered { " (recovered)" } else { "" };
    println!("{}{}{}", "  ".repeat(depth), node.rule, marker);
    for child in &node.entries {
        match &child.element {
            CstElement::Node(inner) => print_cst(inner, depth + 1),
            CstElement::Token(token) => {
                println!("{}{} {:?}", "  ".repeat(depth + 1), child.label, token.text)
            }
        }
    }
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let mut rule = Rule::Program;
    let mut config_path = None;
    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        match (flag.as_str(), rest.next()) {
            ("--rule", Some(name)) => match name.parse::<Rule>() {
                Ok(r) => rule = r,
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            },
            ("--config", Some(path)) => config_path = Some(Path::new(path)),
            _ => usage(),
        }
    }
    let config = match JdlConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let path = &args[1];
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ JDL PARSER TRACER ({})", rule);
    println!("╚═══════════════════════════════════════════════════════════════\n");

    println!("🔤 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    for token in Lexer::new(&content).tokenize() {
        if token.kind == TokenKind::Eof {
            break;
        }
        println!(
            "{:>4}:{:<3} {:<18} {:?}",
            token.span.line,
            token.span.column,
            token.kind.label(),
            token.text
        );
    }
    println!();

    let output = JdlParser::new(config.parser.clone()).parse_rule(rule, &content);

    println!("🌲 CST:");
    println!("─────────────────────────────────────────────────────────────");
    print_cst(&output.cst, 0);
    println!();

    if !output.is_ok() {
        println!("⚠️  SYNTAX ERRORS:");
        println!("─────────────────────────────────────────────────────────────");
        for error in &output.errors {
            println!("  {}", error);
        }
        println!();
    }

    println!("🌳 AST:");
    println!("─────────────────────────────────────────────────────────────");
    let builder = AstBuilder::new();
    let program = if rule == Rule::Program {
        let program = builder.program(&output.cst);
        match serde_json::to_string_pretty(&program) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("{:#?} ({})", program, e),
        }
        Some(program)
    } else {
        match builder.build(&output.cst) {
            Ok(AstNode::Program(program)) => Some(program),
            Ok(node) => {
                println!("{:#?}", node);
                None
            }
            Err(e) => {
                println!("❌ {}", e);
                None
            }
        }
    };
    println!();

    if let Some(program) = program {
        println!("📦 MODEL:");
        println!("─────────────────────────────────────────────────────────────");
        let compilation = ModelCompiler::new(config.compiler.clone()).compile(&program);
        for entity in &compilation.model.entities {
            println!("entity {} ({} fields)", entity.name, entity.fields.len());
            for field in &entity.fields {
                let validations: Vec<String> =
                    field.validations.iter().map(ToString::to_string).collect();
                println!("  {} {} {}", field.name, field.field_type, validations.join(" "));
            }
        }
        for application in &compilation.model.applications {
            println!("{}", application);
        }
        for error in &compilation.errors {
            println!("  ⚠️  {}", error);
        }
        println!();
    }

    if output.is_ok() {
        println!("✅ Parse succeeded!");
    } else {
        println!("❌ Parse finished with {} error(s)", output.errors.len());
        std::process::exit(2);
    }
}
