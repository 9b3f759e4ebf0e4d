//! End-to-end tests: whole programs through parse → evaluate → describe,
//! covering round-trip stability, nesting, variables, and failure modes.

use cadcmd::{
    CommandKind, Engine, EngineError, EvalError, Environment, ParseError, ProgramOutput,
    RunOptions, ShapeClass, StandardMaterials, StubBackend, Warning,
};

fn run(source: &str) -> Result<(ProgramOutput, String), EngineError> {
    let mut backend = StubBackend::new();
    let mut materials = StandardMaterials::new();
    let mut engine = Engine::new(&mut backend, &mut materials);
    let output = engine.run_program(source, RunOptions::default())?;
    let description = engine
        .describe(output.last)
        .expect("last node should describe");
    assert!(!description.is_lossy());
    Ok((output, description.text().to_string()))
}

/// Re-parsing the serialized output of every command kind reproduces an
/// operationally equivalent command tree, and the serialization is a
/// fixed point.
#[test]
fn roundtrip_is_stable_for_every_command_kind() {
    let programs = [
        "CREATE BOX ORIGIN 0 0 0 SIZE 100 50 HEIGHT 75",
        "CREATE ARC CENTER 0 0 0 START 10 0 0 NORMAL 0 0 1 ANGLE 90",
        "CREATE CIRCLE CENTER 5 5 0 RADIUS 50 NORMAL 0 0 1",
        "CREATE LINE FROM 0 0 0 TO 10 0 0",
        "CREATE POLYGON POINTS 0 0 0 10 0 0 10 10 0",
        "CREATE RECTANGLE ORIGIN 0 0 0 SIZE 20 10",
        "CREATE FOLDER NAME fixtures",
        "CREATE PRISM SECTION CREATE CIRCLE CENTER 0 0 0 RADIUS 50 NORMAL 0 0 1 LENGTH 100",
        "CREATE REVOLVE PROFILE CREATE RECTANGLE ORIGIN 10 0 0 SIZE 5 2 \
         AXIS ORIGIN 0 0 0 DIRECTION 0 0 1 ANGLE 180",
        "CREATE SWEEP PROFILE CREATE CIRCLE CENTER 0 0 0 RADIUS 2 NORMAL 0 0 1 \
         PATH CREATE BEZIER POINTS 0 0 0 10 0 5 20 0 0",
        "CREATE BEZIER POINTS 0 0 0 5 5 5",
        "CREATE BOOLEAN COMMON FIRST CREATE BOX ORIGIN 0 0 0 SIZE 10 10 HEIGHT 10 \
         SECOND CREATE BOX ORIGIN 5 5 0 SIZE 10 10 HEIGHT 10",
        "CREATE FACE WIRE CREATE CIRCLE CENTER 0 0 0 RADIUS 5 NORMAL 0 0 1",
        "CREATE WIRE EDGES CREATE LINE FROM 0 0 0 TO 1 0 0 AND CREATE LINE FROM 1 0 0 TO 1 1 0",
        "CREATE THICKSOLID CREATE PRISM SECTION CREATE RECTANGLE ORIGIN 0 0 0 SIZE 20 10 \
         LENGTH 40 THICKNESS 2",
        "CREATE BOX ORIGIN 0 0 0 SIZE 10 10 HEIGHT 10 WITH MATERIAL METALS.POLISHED_STEEL",
    ];
    for program in programs {
        let (_, first_pass) = run(program).unwrap_or_else(|e| panic!("`{program}` failed: {e}"));
        let (_, second_pass) =
            run(&first_pass).unwrap_or_else(|e| panic!("re-parse of `{first_pass}` failed: {e}"));
        assert_eq!(first_pass, second_pass, "round-trip not stable for `{program}`");
    }
}

#[test]
fn roundtrip_canonicalizes_number_formatting() {
    let (_, text) = run("create box origin 0.0 0 0 size 100.00 50 height 75.250").unwrap();
    assert_eq!(text, "CREATE BOX ORIGIN 0 0 0 SIZE 100 50 HEIGHT 75.25");
}

/// Both operands of a boolean parse as full box sub-commands with zero
/// leaked tokens.
#[test]
fn nested_boolean_parses_both_operands() {
    let mut env = Environment::new();
    let command = cadcmd::parse_line(
        "CREATE BOOLEAN CUT FIRST CREATE BOX ORIGIN 0 0 0 SIZE 100 100 HEIGHT 50 \
         SECOND CREATE BOX ORIGIN 25 25 0 SIZE 50 50 HEIGHT 75",
        &mut env,
    )
    .unwrap();
    match command.kind {
        CommandKind::Boolean { first, second, .. } => {
            assert!(matches!(first.kind, CommandKind::Box { origin, .. } if origin == [0.0; 3]));
            assert!(matches!(
                second.kind,
                CommandKind::Box { origin, .. } if origin == [25.0, 25.0, 0.0]
            ));
        }
        other => panic!("expected boolean, got {other:?}"),
    }
}

/// LENGTH binds to the outer prism even though the inner circle's schema
/// ends right before it.
#[test]
fn prism_length_binds_at_outer_depth() {
    let (_, text) =
        run("CREATE PRISM SECTION CREATE CIRCLE CENTER 0 0 0 RADIUS 50 NORMAL 0 0 1 LENGTH 100")
            .unwrap();
    assert!(text.ends_with("LENGTH 100"));
}

/// Referencing `$a` evaluates identically to inlining the bound command.
#[test]
fn variable_substitution_matches_inline() {
    let inlined = run(
        "CREATE PRISM SECTION CREATE CIRCLE CENTER 0 0 0 RADIUS 10 NORMAL 0 0 1 LENGTH 5",
    )
    .unwrap()
    .1;
    let via_variable = run(
        "a = CREATE CIRCLE CENTER 0 0 0 RADIUS 10 NORMAL 0 0 1\n\
         CREATE PRISM SECTION $a LENGTH 5",
    )
    .unwrap()
    .1;
    assert_eq!(inlined, via_variable);
}

/// A backend precondition rejection surfaces as `EvalError::Backend`,
/// never as a parse error.
#[test]
fn backend_rejection_is_an_eval_error() {
    let mut backend = StubBackend::new();
    let mut materials = StandardMaterials::new();
    let mut engine = Engine::new(&mut backend, &mut materials);
    // Parse succeeds first; only then does the backend get a say.
    let source = "CREATE BOOLEAN FUSE FIRST CREATE BOX ORIGIN 0 0 0 SIZE 1 1 HEIGHT 1 \
                  SECOND CREATE BOX ORIGIN 2 0 0 SIZE 1 1 HEIGHT 1";
    engine.run_program(source, RunOptions::default()).unwrap();

    let mut failing = StubBackend::new();
    failing.fail_with = Some("two solids cannot be fused".to_string());
    let mut materials = StandardMaterials::new();
    let mut engine = Engine::new(&mut failing, &mut materials);
    let err = engine.run_program(source, RunOptions::default()).unwrap_err();
    match err {
        EngineError::Eval {
            source: EvalError::Backend(reason),
            ..
        } => assert_eq!(reason, "two solids cannot be fused"),
        other => panic!("expected backend eval error, got {other}"),
    }
}

#[test]
fn unknown_command_names_the_keyword_pair() {
    let err = run("CREATE CYLINDER RADIUS 50 HEIGHT 100").unwrap_err();
    match err {
        EngineError::Parse {
            source: ParseError::UnknownCommand { verb, noun, .. },
            ..
        } => {
            assert_eq!(verb, "CREATE");
            assert_eq!(noun, "CYLINDER");
        }
        other => panic!("expected unknown command, got {other}"),
    }
}

/// Material attachment, both the success and the failure half.
#[test]
fn material_attachment_resolves_against_registry() {
    let mut backend = StubBackend::new();
    let mut materials = StandardMaterials::new();
    let mut engine = Engine::new(&mut backend, &mut materials);
    let output = engine
        .run_program(
            "CREATE BOX ORIGIN 0 0 0 SIZE 10 10 HEIGHT 10 WITH MATERIAL METALS.POLISHED_STEEL",
            RunOptions::default(),
        )
        .unwrap();
    let material_id = engine
        .document()
        .get(output.last)
        .unwrap()
        .material
        .expect("material should be attached");
    drop(engine);
    let handle = cadcmd::MaterialRegistry::get(&materials, material_id).unwrap();
    assert_eq!(handle.category, "Metal");
    assert_eq!(handle.name, "Polished Steel");

    let err = run("CREATE BOX ORIGIN 0 0 0 SIZE 10 10 HEIGHT 10 WITH MATERIAL METALS.UNOBTAINIUM")
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Eval {
            source: EvalError::UnknownMaterial { .. },
            ..
        }
    ));
}

#[test]
fn boolean_consumes_inputs_and_describe_reexpands_them() {
    let mut backend = StubBackend::new();
    let mut materials = StandardMaterials::new();
    let mut engine = Engine::new(&mut backend, &mut materials);
    let output = engine
        .run_program(
            "CREATE BOOLEAN CUT FIRST CREATE BOX ORIGIN 0 0 0 SIZE 100 100 HEIGHT 50 \
             SECOND CREATE BOX ORIGIN 25 25 0 SIZE 50 50 HEIGHT 75",
            RunOptions::default(),
        )
        .unwrap();
    // The two input boxes were consumed; only the boolean node remains.
    assert_eq!(engine.document().len(), 1);
    // Yet the description re-expands both operands as nested sub-commands.
    let text = engine.describe(output.last).unwrap();
    assert!(text.text().contains("FIRST CREATE BOX ORIGIN 0 0 0"));
    assert!(text.text().contains("SECOND CREATE BOX ORIGIN 25 25 0"));
}

#[test]
fn ambiguous_boolean_result_is_a_warning_not_an_error() {
    let mut backend = StubBackend::new();
    backend.boolean_solids = Some(3);
    let mut materials = StandardMaterials::new();
    let mut engine = Engine::new(&mut backend, &mut materials);
    let output = engine
        .run_program(
            "CREATE BOOLEAN CUT FIRST CREATE BOX ORIGIN 0 0 0 SIZE 10 10 HEIGHT 10 \
             SECOND CREATE BOX ORIGIN 20 20 0 SIZE 10 10 HEIGHT 10",
            RunOptions::default(),
        )
        .unwrap();
    assert_eq!(
        output.warnings,
        vec![Warning::AmbiguousBooleanResult { solids: 3 }]
    );
    assert_eq!(
        engine.document().get(output.last).unwrap().class,
        ShapeClass::Compound
    );
}

/// A variable whose memoized node was consumed by a composite reports the
/// variable by name when referenced again, not a missing-shape diagnostic.
#[test]
fn consumed_variable_reference_names_the_variable() {
    let err = run(
        "a = CREATE BOX ORIGIN 0 0 0 SIZE 10 10 HEIGHT 10\n\
         CREATE BOOLEAN CUT FIRST $a SECOND CREATE BOX ORIGIN 5 5 0 SIZE 1 1 HEIGHT 1\n\
         CREATE BOOLEAN CUT FIRST $a SECOND CREATE BOX ORIGIN 0 0 5 SIZE 1 1 HEIGHT 1\n",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Eval {
            line: 3,
            source: EvalError::ConsumedVariable(ref name),
        } if name == "a"
    ));
}

#[test]
fn program_order_is_evaluation_order() {
    let mut backend = StubBackend::new();
    let mut materials = StandardMaterials::new();
    let mut engine = Engine::new(&mut backend, &mut materials);
    engine
        .run_program(
            "CREATE LINE FROM 0 0 0 TO 1 0 0\n\
             CREATE CIRCLE CENTER 0 0 0 RADIUS 1 NORMAL 0 0 1\n\
             CREATE BOX ORIGIN 0 0 0 SIZE 1 1 HEIGHT 1\n",
            RunOptions::default(),
        )
        .unwrap();
    drop(engine);
    let ops: Vec<&str> = backend
        .calls
        .iter()
        .map(|c| c.split(' ').next().unwrap())
        .collect();
    assert_eq!(ops, vec!["line", "circle", "box"]);
}

#[test]
fn deep_nesting_hits_recursion_guard() {
    // A self-referential chain of thick solids, deep enough to trip the
    // parser's depth limit.
    let mut source = String::new();
    let mut inner = "CREATE BOX ORIGIN 0 0 0 SIZE 1 1 HEIGHT 1".to_string();
    for _ in 0..80 {
        inner = format!("CREATE THICKSOLID {inner} THICKNESS 1");
    }
    source.push_str(&inner);
    let err = run(&source).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Parse {
            source: ParseError::TooDeeplyNested { .. },
            ..
        }
    ));
}

#[test]
fn multi_variable_program_builds_composite() {
    let (output, text) = run(
        "left = CREATE BOX ORIGIN 0 0 0 SIZE 40 40 HEIGHT 20\n\
         right = CREATE BOX ORIGIN 20 0 0 SIZE 40 40 HEIGHT 20\n\
         CREATE BOOLEAN FUSE FIRST $left SECOND $right\n",
    )
    .unwrap();
    assert!(output.warnings.is_empty());
    assert_eq!(
        text,
        "CREATE BOOLEAN FUSE FIRST CREATE BOX ORIGIN 0 0 0 SIZE 40 40 HEIGHT 20 \
         SECOND CREATE BOX ORIGIN 20 0 0 SIZE 40 40 HEIGHT 20"
    );
}
