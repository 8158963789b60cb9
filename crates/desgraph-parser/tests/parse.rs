use desgraph_core::{
    identifier::Id,
    module::{Direction, Module, WireKind},
};
use desgraph_parser::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    parse,
};
use proptest::prelude::*;

const M1: &str = "\
// two inverters in series
module M1(a, b);
  input a;
  output b;
  wire w dependency;
  INV i1(.i(a), .o(w));
  INV i2(.i(w), .o(b));
endmodule
";

fn parse_ok(source: &str) -> (Module, Vec<Diagnostic>) {
    let mut warnings: Vec<Diagnostic> = Vec::new();
    let module = parse(source, &mut warnings)
        .unwrap_or_else(|err| panic!("failed to parse:\n{source}\n{err}"));
    (module, warnings)
}

fn error_code(source: &str) -> Option<ErrorCode> {
    let mut warnings: Vec<Diagnostic> = Vec::new();
    let err = parse(source, &mut warnings).expect_err("source should not parse");
    assert_eq!(err.diagnostics().len(), 1);
    err.diagnostics()[0].code()
}

fn id(name: &str) -> Id {
    Id::new(name)
}

#[test]
fn test_m1_structure() {
    let (module, warnings) = parse_ok(M1);

    assert_eq!(module.name(), "M1");
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

    let ports: Vec<Id> = module.ports().iter().copied().collect();
    assert_eq!(ports, vec![id("a"), id("b")]);
    assert_eq!(module.inputs().get(&id("a")), Some(&Some(id("i1"))));
    assert_eq!(module.outputs().get(&id("b")), Some(&Some(id("i2"))));

    let dependency: Vec<_> = module.dependency_wires().collect();
    assert_eq!(dependency.len(), 1);
    let (name, wire) = dependency[0];
    assert_eq!(name, id("w"));
    assert_eq!(wire.endpoints().pair(), Some((id("i1"), id("i2"))));
    assert_eq!(module.stream_wires().count(), 0);

    let instances: Vec<Id> = module.instances().keys().copied().collect();
    assert_eq!(instances, vec![id("i1"), id("i2")]);
}

#[test]
fn test_comments_between_statements() {
    let source = "\
# header comment
module C(x, y); /* block
   comment */
  input x; // trailing
  output y;
  /* stream between the two */ wire s stream;
  SRC g1(.o(s), .i(x));
  SNK g2(.i(s), .o(y));
endmodule";

    let (module, warnings) = parse_ok(source);

    assert!(warnings.is_empty());
    assert_eq!(module.wire(id("s")).map(|w| w.kind()), Some(WireKind::Stream));
    assert_eq!(module.direction(id("x")), Some(Direction::Input));
}

#[test]
fn test_multiline_instance() {
    let source = "\
module T(a, b);
  input a;
  output b;
  AND2 g(
    .x(a),
    .y(b)
  );
endmodule";

    let (module, _) = parse_ok(source);

    let g = module.instance(id("g")).unwrap();
    assert_eq!(g.module_name(), "AND2");
    assert_eq!(g.connection_count(), 2);
}

#[test]
fn test_comments_inside_instance() {
    let source = "\
module T(a, b);
  input a;
  output b;
  INV i(
    // pin
    .i(a),
    /* drives the port */ .o(b)
  );
endmodule";

    let (module, warnings) = parse_ok(source);

    assert!(warnings.is_empty());
    let i = module.instance(id("i")).unwrap();
    assert_eq!(i.wire(id("i")), Some(id("a")));
    assert_eq!(i.wire(id("o")), Some(id("b")));
}

#[test]
fn test_undeclared_io_port() {
    assert_eq!(
        error_code("module M(a); input x; endmodule"),
        Some(ErrorCode::E203)
    );
}

#[test]
fn test_duplicate_wire() {
    let source = "module M(a);\n  wire w dependency;\n  wire w stream;\nendmodule";
    let mut warnings: Vec<Diagnostic> = Vec::new();

    let err = parse(source, &mut warnings).unwrap_err();
    let diag = &err.diagnostics()[0];

    assert_eq!(diag.code(), Some(ErrorCode::E205));
    let secondary = diag.labels().iter().find(|l| l.is_secondary()).unwrap();
    assert_eq!(&source[secondary.span().start()..secondary.span().end()], "wire w dependency");
}

#[test]
fn test_third_endpoint() {
    let source = "\
module M(a);
  wire w dependency;
  A x(.o(w));
  B y(.i(w));
  C z(.i(w));
endmodule";

    assert_eq!(error_code(source), Some(ErrorCode::E209));
}

#[test]
fn test_error_codes() {
    let cases = [
        ("module M(a); /* open", ErrorCode::E001),
        ("module M(a); endmodule /", ErrorCode::E002),
        ("module M(a); input a endmodule", ErrorCode::E100),
        ("module M(a); input a;", ErrorCode::E101),
        ("module M(a); input\na; endmodule", ErrorCode::E102),
        ("wire w stream; module M(); endmodule", ErrorCode::E103),
        ("module M(); endmodule junk", ErrorCode::E103),
        ("module M(a b); endmodule", ErrorCode::E200),
        ("module M a, b; endmodule", ErrorCode::E201),
        ("module M(a, a); endmodule", ErrorCode::E202),
        ("module M(a); input a; output a; endmodule", ErrorCode::E204),
        ("module M(a); wire a stream; endmodule", ErrorCode::E205),
        ("module M(); wire w wide; endmodule", ErrorCode::E206),
        ("module M(); X u(.p(q)); endmodule", ErrorCode::E207),
        ("module M(a); X u(.p(a)); endmodule", ErrorCode::E207),
        ("module M(a); input a; X u(.p(a)); X u(.q(a)); endmodule", ErrorCode::E208),
        ("module M(); X u(); endmodule", ErrorCode::E210),
        ("module M(a); input a; X u(.p(a)); Y v(.p(a)); endmodule", ErrorCode::E211),
        ("module M(a); input a; X u(.p(a), .p(a)); endmodule", ErrorCode::E212),
        ("module M(a); input a; X u .p(a); endmodule", ErrorCode::E213),
        ("module M(); wire w; endmodule", ErrorCode::E214),
    ];

    for (source, expected) in cases {
        let mut warnings: Vec<Diagnostic> = Vec::new();
        let result = parse(source, &mut warnings);
        let code = result.err().and_then(|err| err.diagnostics()[0].code());
        assert_eq!(code, Some(expected), "source: {source:?}");
    }
}

#[test]
fn test_warnings_reach_sink() {
    let source = "\
module W(a, b, c);
  input a;
  output b;
  wire half stream;
  X u(.p(a), .q(half));
endmodule";
    let mut collector = DiagnosticCollector::new();

    parse(source, &mut collector).unwrap();

    let codes: Vec<ErrorCode> = collector
        .diagnostics()
        .iter()
        .filter_map(Diagnostic::code)
        .collect();
    assert_eq!(codes, vec![ErrorCode::W001, ErrorCode::W003, ErrorCode::W002]);
    assert!(!collector.has_errors());
}

#[test]
fn test_failed_parse_emits_no_warnings() {
    let mut warnings: Vec<Diagnostic> = Vec::new();

    let result = parse("module M(a, b); wire w stream; endmodule /* open", &mut warnings);

    assert!(result.is_err());
    assert!(warnings.is_empty());
}

#[test]
fn test_render_round_trip() {
    let (module, _) = parse_ok(M1);

    let rendered = module.to_string();
    let (reparsed, _) = parse_ok(&rendered);

    assert_eq!(reparsed, module);
    assert_eq!(reparsed.to_string(), rendered);
}

/// Names that cannot collide with a keyword.
fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}".prop_map(|s| format!("n_{s}"))
}

proptest! {
    /// A chain `in -> g0 -> g1 -> ... -> out` survives render and re-parse.
    #[test]
    fn prop_chain_round_trip(
        cells in prop::collection::vec(name(), 1..6),
        kinds in prop::collection::vec(any::<bool>(), 6),
    ) {
        let mut source = String::from("module chain(pin, pout);\n  input pin;\n  output pout;\n");
        for (idx, kind) in kinds.iter().enumerate().take(cells.len() - 1) {
            let kind = if *kind { "stream" } else { "dependency" };
            source.push_str(&format!("  wire w{idx} {kind};\n"));
        }
        for (idx, cell) in cells.iter().enumerate() {
            let input = if idx == 0 { "pin".to_string() } else { format!("w{}", idx - 1) };
            let output = if idx + 1 == cells.len() { "pout".to_string() } else { format!("w{idx}") };
            source.push_str(&format!("  {cell} g{idx}(.i({input}), .o({output}));\n"));
        }
        source.push_str("endmodule\n");

        let mut warnings: Vec<Diagnostic> = Vec::new();
        let module = parse(&source, &mut warnings).unwrap();
        prop_assert!(warnings.is_empty());
        prop_assert_eq!(module.instances().len(), cells.len());

        let rendered = module.to_string();
        let reparsed = parse(&rendered, &mut warnings).unwrap();
        prop_assert_eq!(&reparsed, &module);
        prop_assert_eq!(reparsed.to_string(), rendered);
    }
}
