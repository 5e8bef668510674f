//! Fragments WGSL fixes entourant le code généré

/// Point d'entrée du vertex shader
pub const VERTEX_ENTRY_POINT: &str = "vertex_main";

/// Point d'entrée du fragment shader
pub const FRAGMENT_ENTRY_POINT: &str = "pixel_main";

/// Étape de vertex: triangle plein écran et coordonnée interpolée dans [0,1]²
///
/// Le triangle (-1,-1) (3,-1) (-1,3) couvre tout le viewport sans la couture
/// diagonale de deux triangles.
pub const VERTEX_PREAMBLE: &str = r#"struct Uniforms {
    time: f32,
    resolution: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vertex_main(@builtin(vertex_index) vertex_id: u32) -> VertexOut {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    let position = positions[vertex_id];

    var result: VertexOut;
    result.position = vec4<f32>(position, 0.0, 1.0);
    result.uv = (position + vec2<f32>(1.0, 1.0)) * 0.5;
    return result;
}
"#;

/// Ouverture de la fonction de fragment: lie `uv`, `time` et `resolution`
///
/// Ce sont des `var`: le corps généré peut les réaffecter comme toute autre variable.
pub const FRAGMENT_PREAMBLE: &str = r#"@fragment
fn pixel_main(vertex_out: VertexOut) -> @location(0) vec4<f32> {
    var uv = vertex_out.uv;
    var time = uniforms.time;
    var resolution = uniforms.resolution;"#;

/// Fermeture de la fonction de fragment
pub const FRAGMENT_CLOSING: &str = "}";
