//! Tests de l'assembleur de shaders
//!
//! Ces tests vérifient le texte généré (ordre, formes des instructions,
//! noms d'hygiène) et sa validité WGSL sans GPU.

use glam::Vec2;
use pixel_shader_rust::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn named(name: &str) -> ExpressionBuilder {
    ExpressionBuilder::named(name)
}

#[test]
fn test_scalar_declaration_scenario() {
    let program = shader_builder()
        .declare(ShaderType::Float, named("x").expression("1.0 + 2.0"))
        .finalize("x, x, x, 1.0")
        .unwrap();
    let source = program.source();

    assert!(source.contains("var x: f32 = f32(1.0 + 2.0);"));
    assert!(source.contains("return vec4<f32>(x, x, x, 1.0);"));
    assert!(validate_program(&program).is_ok());
}

#[test]
fn test_empty_body_renders_black() {
    let program = shader_builder().finalize("0.0, 0.0, 0.0, 1.0").unwrap();
    let expected = format!(
        "{}\n    return vec4<f32>(0.0, 0.0, 0.0, 1.0);\n}}\n",
        FRAGMENT_PREAMBLE
    );

    assert_eq!(program.source(), expected);
    assert!(validate_program(&program).is_ok());
}

#[test]
fn test_every_type_tag_declares() {
    let program = shader_builder()
        .float(named("a").expression("0.5"))
        .float2(named("b").expression("uv"))
        .float3(named("c").expression("a, b"))
        .float4(named("d").expression("c, 1.0"))
        .finalize("d")
        .unwrap();
    let source = program.source();

    assert!(source.contains("var a: f32 = f32(0.5);"));
    assert!(source.contains("var b: vec2<f32> = vec2<f32>(uv);"));
    assert!(source.contains("var c: vec3<f32> = vec3<f32>(a, b);"));
    assert!(source.contains("var d: vec4<f32> = vec4<f32>(c, 1.0);"));
    assert!(validate_program(&program).is_ok());
}

#[test]
fn test_prefix_statements_immediately_precede_declaration() {
    let program = shader_builder()
        .float(named("disk").circle_at(Vec2::new(0.25, 0.75), 0.2, true))
        .finalize("disk, disk, disk, 1.0")
        .unwrap();
    let lines: Vec<&str> = program.source().lines().map(str::trim).collect();

    let declaration = lines
        .iter()
        .position(|l| l.starts_with("var disk: f32"))
        .unwrap();
    assert_eq!(
        lines[declaration - 1],
        "let _tmp0: f32 = distance(uv, vec2<f32>(0.25, 0.75));"
    );
    assert!(validate_program(&program).is_ok());
}

#[test]
fn test_headers_precede_preamble_in_append_order() {
    let program = shader_builder()
        .header("const TAU: f32 = 6.2831853;")
        .float(named("phase").expression("time * TAU"))
        .header("fn wobble(v: f32) -> f32 { return sin(v) * 0.5 + 0.5; }")
        .finalize("wobble(phase), 0.0, 0.0, 1.0")
        .unwrap();
    let source = program.source();

    let tau = source.find("const TAU").unwrap();
    let wobble = source.find("fn wobble").unwrap();
    let preamble = source.find("@fragment").unwrap();
    let body = source.find("var phase").unwrap();
    assert!(tau < wobble && wobble < preamble && preamble < body);
    assert!(validate_program(&program).is_ok());
}

#[test]
fn test_malformed_declaration_aborts_finalize() {
    let result = shader_builder()
        .float(named("ok").expression("1.0"))
        .float(named("broken"))
        .finalize("ok, ok, ok, 1.0");

    assert_eq!(
        result.unwrap_err(),
        HeavyError::malformed("broken", MissingField::Value)
    );
}

#[test]
fn test_malformed_expression_reaches_global_sink() {
    let result = shader_builder()
        .increment(named("unset_offset"))
        .finalize("1.0");

    assert_eq!(
        result.unwrap_err(),
        HeavyError::malformed("unset_offset", MissingField::Value)
    );
    // Seules des expressions malformées sont rapportées dans ce binaire de test
    assert!(matches!(
        get_last_error(),
        Some(HeavyError::MalformedExpression { .. })
    ));
}

#[test]
fn test_fragment_inputs_can_be_reassigned() {
    let program = shader_builder()
        .increment(named("uv").expression("vec2<f32>(time * 0.1, 0.0)"))
        .assign(named("time").expression("time * 2.0"))
        .decrement(named("resolution").expression("vec2<f32>(1.0, 1.0)"))
        .finalize("uv, fract(time), 1.0")
        .unwrap();

    assert!(program.source().contains("uv += vec2<f32>(time * 0.1, 0.0);"));
    if let Err(err) = validate_program(&program) {
        panic!("entrées de fragment non modifiables: {}", err);
    }
}

#[test]
fn test_raw_code_is_kept_verbatim() {
    let program = shader_builder()
        .code("var acc: f32 = 0.0;\nfor (var i: i32 = 0; i < 4; i++) {\n    acc += 0.25;\n}")
        .finalize("acc, acc, acc, 1.0")
        .unwrap();

    assert!(program.source().contains("    for (var i: i32 = 0; i < 4; i++) {\n        acc += 0.25;\n    }"));
    assert!(validate_program(&program).is_ok());
}

#[test]
fn test_hygiene_names_never_collide() {
    let mut builder = shader_builder();
    for i in 0..10_000 {
        builder = builder.float(named(&format!("n{}", i)).hash_noise(DEFAULT_NOISE_SCALE));
    }
    let program = builder.finalize("0.0, 0.0, 0.0, 1.0").unwrap();

    let mut seen = HashSet::new();
    for line in program.source().lines() {
        if let Some(rest) = line.trim().strip_prefix("let _tmp") {
            let name = rest.split(':').next().unwrap().to_string();
            assert!(seen.insert(name), "nom d'hygiène dupliqué");
        }
    }
    assert_eq!(seen.len(), 10_000);
}

#[test]
fn test_independent_noise_nodes_use_distinct_helpers() {
    let program = shader_builder()
        .float(named("a").hash_noise(4.0))
        .float(named("b").hash_noise(4.0))
        .finalize("a, b, 0.0, 1.0")
        .unwrap();
    let source = program.source();

    assert!(source.contains("var a: f32 = f32(fract(_tmp0));"));
    assert!(source.contains("var b: f32 = f32(fract(_tmp1));"));
    assert!(validate_program(&program).is_ok());
}

#[test]
fn test_assignment_with_helper_stays_valid() {
    let program = shader_builder()
        .float(named("v").expression("0.0"))
        .assign(named("v").circle_at(Vec2::splat(0.5), 0.4, false))
        .increment(named("v").wave_along_y(DEFAULT_WAVE_FREQUENCY, DEFAULT_WAVE_SPEED))
        .finalize("v, v, v, 1.0")
        .unwrap();

    assert!(program.source().contains("v = 1.0 - step(0.4, _tmp0);"));
    assert!(program.source().contains("v += sin(uv.y * 10.0 + time * 1.0);"));
    assert!(validate_program(&program).is_ok());
}

#[test]
fn test_same_program_shared_between_clones() {
    let program = shader_builder().finalize("uv, 0.0, 1.0").unwrap();
    let copy = program.clone();
    assert_eq!(program, copy);
    assert_eq!(program.module_source(), copy.module_source());
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Assign,
    Increment,
    Decrement,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Assign), Just(Op::Increment), Just(Op::Decrement)]
}

proptest! {
    #[test]
    fn prop_assignments_keep_call_order(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut builder = shader_builder().float(named("acc").expression("0.0"));
        for (i, op) in ops.iter().enumerate() {
            let node = named("acc").expression(format!("{}.0", i));
            builder = match op {
                Op::Assign => builder.assign(node),
                Op::Increment => builder.increment(node),
                Op::Decrement => builder.decrement(node),
            };
        }
        let program = builder.finalize("acc, acc, acc, 1.0").unwrap();

        let emitted: Vec<String> = program
            .source()
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("acc "))
            .map(str::to_string)
            .collect();
        prop_assert_eq!(emitted.len(), ops.len());

        for (i, (line, op)) in emitted.iter().zip(ops.iter()).enumerate() {
            let symbol = match op {
                Op::Assign => "=",
                Op::Increment => "+=",
                Op::Decrement => "-=",
            };
            prop_assert_eq!(line, &format!("acc {} {}.0;", symbol, i));
        }
    }

    #[test]
    fn prop_declarations_render_verbatim(value in "[a-z0-9 .+*]{1,24}") {
        let program = shader_builder()
            .float3(named("c").expression(value.clone()))
            .finalize("c, 1.0")
            .unwrap();
        let expected = format!("var c: vec3<f32> = vec3<f32>({});", value);
        prop_assert!(program.source().contains(&expected));
    }
}
