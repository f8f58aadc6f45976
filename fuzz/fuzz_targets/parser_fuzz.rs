//! Fuzz test for the JDL parser
//!
//! Arbitrary UTF-8 must parse (with recovery) without panicking or looping,
//! every syntax error must carry a position, and the AST builder and model
//! compiler must accept whatever CST comes out.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use jdl_dsl::{AstBuilder, JdlParser, ModelCompiler, ParserConfig, Rule};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        for config in [ParserConfig::default(), ParserConfig::reduced()] {
            let mut parser = JdlParser::new(config);
            let output = parser.parse(input);

            assert_eq!(output.cst.rule, Rule::Program);
            for error in &output.errors {
                assert!(error.line >= 1, "Error line should be >= 1");
                assert!(error.column >= 1, "Error column should be >= 1");
                assert!(!error.expected.is_empty(), "Error should name what was expected");
            }

            let program = AstBuilder::new().program(&output.cst);
            let _ = ModelCompiler::default().compile(&program);
        }

        // Every rule is an entry point and must cope with any input too.
        let mut parser = JdlParser::default();
        for rule in Rule::ALL {
            let _ = parser.parse_rule(*rule, input);
        }
    }
});
