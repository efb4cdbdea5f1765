#![allow(dead_code)]

use base64::Engine as _;

/// Positions of the triangle every document draws.
pub(crate) const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

pub(crate) const BASE_COLOR: [f32; 4] = [1.0, 0.5, 0.0, 1.0];

pub(crate) fn triangle_bytes() -> Vec<u8> {
    bytemuck::cast_slice(&TRIANGLE).to_vec()
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// A single-mesh glTF document assembled from optional parts.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Document {
    /// A primitive with plain triangle positions.
    pub(crate) plain: bool,
    /// A primitive whose positions only exist inside a Draco stream.
    pub(crate) draco: bool,
    /// A base colour texture that is only available as KTX2.
    pub(crate) basisu_texture: bool,
}

impl Document {
    pub(crate) fn triangle() -> Self {
        Self {
            plain: true,
            ..Default::default()
        }
    }

    pub(crate) fn to_json(self) -> String {
        let mut required = Vec::new();
        let mut primitives = Vec::new();
        if self.plain {
            primitives.push(r#"{"attributes":{"POSITION":0},"material":0}"#.to_string());
        }
        if self.draco {
            required.push(r#""KHR_draco_mesh_compression""#);
            primitives.push(
                r#"{"attributes":{"POSITION":1},"material":0,"extensions":{"KHR_draco_mesh_compression":{"bufferView":0,"attributes":{"POSITION":0}}}}"#
                    .to_string(),
            );
        }
        let (material, textures) = if self.basisu_texture {
            required.push(r#""KHR_texture_basisu""#);
            (
                format!(
                    r#"{{"pbrMetallicRoughness":{{"baseColorFactor":{:?},"baseColorTexture":{{"index":0}}}}}}"#,
                    BASE_COLOR
                ),
                r#","images":[{"uri":"tex.ktx2"}],"textures":[{"extensions":{"KHR_texture_basisu":{"source":0}}}]"#,
            )
        } else {
            (
                format!(r#"{{"pbrMetallicRoughness":{{"baseColorFactor":{:?}}}}}"#, BASE_COLOR),
                "",
            )
        };
        let bytes = triangle_bytes();
        let required = required.join(",");

        format!(
            r#"{{
  "asset": {{"version": "2.0"}},
  "extensionsUsed": [{required}],
  "extensionsRequired": [{required}],
  "scene": 0,
  "scenes": [{{"nodes": [0]}}],
  "nodes": [{{"mesh": 0}}],
  "meshes": [{{"primitives": [{primitives}]}}],
  "materials": [{material}],
  "buffers": [{{"uri": "{buffer}", "byteLength": {length}}}],
  "bufferViews": [{{"buffer": 0, "byteLength": {length}}}],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0]}},
    {{"componentType": 5126, "count": 3, "type": "VEC3", "min": [-5, -5, -5], "max": [5, 5, 5]}}
  ]{textures}
}}"#,
            required = required,
            primitives = primitives.join(","),
            material = material,
            buffer = data_uri("application/octet-stream", &bytes),
            length = bytes.len(),
            textures = textures,
        )
    }

    /// The document itself as a `data:` URI, usable as a model location.
    pub(crate) fn to_data_uri(self) -> String {
        data_uri("model/gltf+json", self.to_json().as_bytes())
    }
}
