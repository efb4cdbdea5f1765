//! glTF/GLB loading with configurable decoder plugins.
//!
//! A [`GltfLoader`] fetches a model, checks that every extension the file
//! requires is covered, and converts the default scene into scene nodes.
//! [`DracoLoader`] and [`Ktx2Loader`] carry where the Draco decoder and the
//! Basis transcoder live and which variant is used. Compressed geometry and
//! KTX2 images are not decoded here: such primitives are skipped and such
//! images are replaced by a flat texture, with a warning naming the
//! configured location.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{Context as _, bail};
use base64::Engine as _;

use crate::{
    data_structures::{
        model,
        scene_graph::{ContainerNode, SceneNode, to_scene_node},
        texture::Texture,
    },
    resources::{load_binary, resolve_uri, texture::material_layout},
};

pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";
pub const BASISU_EXTENSION: &str = "KHR_texture_basisu";
const KTX2_MIME_TYPE: &str = "image/ktx2";

/// Extensions whose absence of support only changes appearance slightly.
const TOLERATED_EXTENSIONS: [&str; 4] = [
    "KHR_materials_unlit",
    "KHR_materials_emissive_strength",
    "KHR_texture_transform",
    "KHR_mesh_quantization",
];

/// Which Draco decoder build to fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecoderType {
    #[default]
    Js,
    Wasm,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DracoLoader {
    decoder_path: String,
    decoder_type: DecoderType,
}

impl DracoLoader {
    pub fn new() -> Self {
        Self {
            decoder_path: crate::config::DRACO_DECODER_LOCATION.to_string(),
            decoder_type: DecoderType::default(),
        }
    }

    pub fn set_decoder_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.decoder_path = path.into();
        self
    }

    pub fn set_decoder_config(&mut self, decoder_type: DecoderType) -> &mut Self {
        self.decoder_type = decoder_type;
        self
    }

    pub fn decoder_path(&self) -> &str {
        &self.decoder_path
    }

    pub fn decoder_type(&self) -> DecoderType {
        self.decoder_type
    }

    /// URLs of the decoder files for the configured build.
    pub fn decoder_files(&self) -> Vec<String> {
        let files: &[&str] = match self.decoder_type {
            DecoderType::Js => &["draco_decoder.js"],
            DecoderType::Wasm => &["draco_wasm_wrapper.js", "draco_decoder.wasm"],
        };
        files
            .iter()
            .map(|file| join_path(&self.decoder_path, file))
            .collect()
    }
}

impl Default for DracoLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Compressed texture families the device can sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureSupport {
    pub astc: bool,
    pub bc: bool,
    pub etc2: bool,
}

impl TextureSupport {
    pub fn from_features(features: wgpu::Features) -> Self {
        Self {
            astc: features.contains(wgpu::Features::TEXTURE_COMPRESSION_ASTC),
            bc: features.contains(wgpu::Features::TEXTURE_COMPRESSION_BC),
            etc2: features.contains(wgpu::Features::TEXTURE_COMPRESSION_ETC2),
        }
    }

    /// Best format to transcode Basis textures into.
    pub fn transcode_target(&self) -> TranscodeTarget {
        if self.astc {
            TranscodeTarget::Astc4x4
        } else if self.bc {
            TranscodeTarget::Bc7
        } else if self.etc2 {
            TranscodeTarget::Etc2
        } else {
            TranscodeTarget::Rgba8
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscodeTarget {
    Astc4x4,
    Bc7,
    Etc2,
    Rgba8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ktx2Loader {
    transcoder_path: String,
    support: Option<TextureSupport>,
}

impl Ktx2Loader {
    pub fn new() -> Self {
        Self {
            transcoder_path: crate::config::KTX2_TRANSCODER_LOCATION.to_string(),
            support: None,
        }
    }

    pub fn set_transcoder_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.transcoder_path = path.into();
        self
    }

    /// Read the compressed formats the active device supports.
    pub fn detect_support(&mut self, device: &wgpu::Device) -> &mut Self {
        self.with_support(TextureSupport::from_features(device.features()))
    }

    pub fn with_support(&mut self, support: TextureSupport) -> &mut Self {
        log::debug!("KTX2 transcode target: {:?}", support.transcode_target());
        self.support = Some(support);
        self
    }

    pub fn transcoder_path(&self) -> &str {
        &self.transcoder_path
    }

    pub fn support(&self) -> Option<TextureSupport> {
        self.support
    }

    /// `None` until support was detected.
    pub fn transcode_target(&self) -> Option<TranscodeTarget> {
        self.support.map(|support| support.transcode_target())
    }

    pub fn transcoder_files(&self) -> Vec<String> {
        ["basis_transcoder.js", "basis_transcoder.wasm"]
            .iter()
            .map(|file| join_path(&self.transcoder_path, file))
            .collect()
    }
}

impl Default for Ktx2Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn join_path(dir: &str, file: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') {
        format!("{}{}", dir, file)
    } else {
        format!("{}/{}", dir, file)
    }
}

/// Raw bytes by location; every location is fetched at most once.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn get_or_fetch(&self, location: &str) -> anyhow::Result<Arc<Vec<u8>>> {
        self.fetch_with(location, |location| async move { load_binary(&location).await })
            .await
    }

    /// Return the cached bytes or run `fetch` and remember its result.
    /// Failed fetches are not cached.
    pub async fn fetch_with<F, Fut>(&self, location: &str, fetch: F) -> anyhow::Result<Arc<Vec<u8>>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<u8>>>,
    {
        let cached = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .cloned();
        if let Some(bytes) = cached {
            log::debug!("Asset cache hit for {}", location);
            return Ok(bytes);
        }
        let bytes = Arc::new(fetch(location.to_string()).await?);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location.to_string(), bytes.clone());
        Ok(bytes)
    }
}

#[derive(Clone, Debug, Default)]
pub struct GltfLoader {
    draco: Option<DracoLoader>,
    ktx2: Option<Ktx2Loader>,
    cache: Arc<AssetCache>,
}

impl GltfLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share fetched bytes with other loaders.
    pub fn with_cache(mut self, cache: Arc<AssetCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn set_draco_loader(&mut self, draco: DracoLoader) -> &mut Self {
        self.draco = Some(draco);
        self
    }

    pub fn set_ktx2_loader(&mut self, ktx2: Ktx2Loader) -> &mut Self {
        self.ktx2 = Some(ktx2);
        self
    }

    pub fn draco_loader(&self) -> Option<&DracoLoader> {
        self.draco.as_ref()
    }

    pub fn ktx2_loader(&self) -> Option<&Ktx2Loader> {
        self.ktx2.as_ref()
    }

    pub fn cache(&self) -> &Arc<AssetCache> {
        &self.cache
    }

    /// Fail if a required extension is neither tolerated nor covered by a
    /// configured plugin.
    pub fn check_required_extensions<'e>(
        &self,
        required: impl IntoIterator<Item = &'e str>,
    ) -> anyhow::Result<()> {
        for extension in required {
            match extension {
                DRACO_EXTENSION if self.draco.is_none() => {
                    bail!("{} is required but no Draco loader is configured", extension)
                }
                BASISU_EXTENSION if self.ktx2.is_none() => {
                    bail!("{} is required but no KTX2 loader is configured", extension)
                }
                DRACO_EXTENSION | BASISU_EXTENSION => (),
                ext if TOLERATED_EXTENSIONS.contains(&ext) => {
                    log::warn!("Required extension {} is only partially supported", ext)
                }
                ext => bail!("Unsupported required extension {}", ext),
            }
        }
        Ok(())
    }

    /// Parse and validate a glTF or GLB document.
    ///
    /// Required extensions are checked against the configured plugins first
    /// and then dropped from the document, since the parser itself rejects
    /// the ones it cannot decode.
    pub fn parse(&self, bytes: &[u8]) -> anyhow::Result<gltf::Gltf> {
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice_without_validation(bytes)?;
        let mut root = document.into_json();

        self.check_required_extensions(root.extensions_required.iter().map(String::as_str))?;
        for extension in &root.extensions_used {
            if !root.extensions_required.contains(extension) {
                log::debug!("Model uses optional extension {}", extension);
            }
        }
        root.extensions_required.clear();

        let redirected = redirect_basisu_sources(&mut root);
        if redirected > 0 {
            log::debug!("{} textures only reference a KTX2 image", redirected);
        }

        let document = gltf::Document::from_json(root)?;
        Ok(gltf::Gltf { document, blob })
    }

    /// Fetch and convert the model at `url` into a scene graph.
    pub async fn load(
        &self,
        url: &str,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<Box<dyn SceneNode>> {
        log::info!("Loading model {}", url);
        let bytes = self
            .cache
            .get_or_fetch(url)
            .await
            .with_context(|| format!("Could not fetch model {}", url))?;
        let gltf = self
            .parse(&bytes)
            .with_context(|| format!("{} is not a valid glTF or GLB file", url))?;

        let buffers = self.load_buffers(&gltf, url).await?;
        self.warn_compressed_primitives(&gltf);
        let materials = self.load_materials(&gltf, url, &buffers, device, queue).await?;

        let scene = gltf
            .default_scene()
            .or_else(|| gltf.scenes().next())
            .context("The model contains no scene")?;
        let mut nodes: Vec<Box<dyn SceneNode>> = scene
            .nodes()
            .map(|node| to_scene_node(0, node, &buffers, device, &materials))
            .collect();
        log::info!("Loaded model {} with {} root nodes", url, nodes.len());

        if nodes.len() == 1 {
            if let Some(node) = nodes.pop() {
                return Ok(node);
            }
        }
        let mut root_node = ContainerNode::new();
        root_node.children = nodes;
        Ok(Box::new(root_node))
    }

    async fn load_buffers(&self, gltf: &gltf::Gltf, base: &str) -> anyhow::Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .clone()
                    .context("The model references a binary chunk it does not contain")?,
                gltf::buffer::Source::Uri(uri) => self.load_uri(base, uri).await?,
            };
            if data.len() < buffer.length() {
                bail!(
                    "Buffer {} holds {} bytes but declares {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                );
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }

    async fn load_uri(&self, base: &str, uri: &str) -> anyhow::Result<Vec<u8>> {
        if let Some(data) = decode_data_uri(uri) {
            return data;
        }
        let location = resolve_uri(base, uri)?;
        let bytes = self
            .cache
            .get_or_fetch(&location)
            .await
            .with_context(|| format!("Could not fetch {}", location))?;
        Ok(bytes.as_ref().clone())
    }

    fn warn_compressed_primitives(&self, gltf: &gltf::Gltf) {
        let compressed = gltf
            .meshes()
            .flat_map(|mesh| mesh.primitives())
            .filter(is_compressed)
            .count();
        if compressed == 0 {
            return;
        }
        match &self.draco {
            Some(draco) => log::warn!(
                "{} Draco compressed primitives are skipped (decoder at {}, {:?})",
                compressed,
                draco.decoder_path(),
                draco.decoder_type()
            ),
            None => log::warn!(
                "{} primitives have no readable geometry and are skipped",
                compressed
            ),
        }
    }

    async fn load_materials(
        &self,
        gltf: &gltf::Gltf,
        base: &str,
        buffers: &[Vec<u8>],
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<Vec<model::Material>> {
        let layout = material_layout(device);
        let white = Texture::white(device, queue);
        let mut images: HashMap<usize, Texture> = HashMap::new();
        let mut materials = Vec::new();

        for material in gltf.materials() {
            let name = material.name().unwrap_or("material");
            let pbr = material.pbr_metallic_roughness();
            let diffuse_texture = match pbr
                .base_color_texture()
                .map(|info| (info.texture().index(), texture_image(gltf, &info.texture())))
            {
                Some((texture, None)) => {
                    log::warn!("Texture {} of material {} has no image", texture, name);
                    white.clone()
                }
                Some((_, Some(image))) => {
                    match images.get(&image.index()) {
                        Some(texture) => texture.clone(),
                        None => {
                            let texture = match self.load_image(&image, base, buffers, device, queue).await {
                                Ok(texture) => texture,
                                Err(e) => {
                                    log::warn!("Image {} of material {}: {:#}", image.index(), name, e);
                                    white.clone()
                                }
                            };
                            images.insert(image.index(), texture.clone());
                            texture
                        }
                    }
                }
                None => white.clone(),
            };
            materials.push(model::Material::new(
                device,
                name,
                pbr.base_color_factor(),
                diffuse_texture,
                &layout,
            ));
        }
        materials.push(model::Material::new(
            device,
            "default material",
            [1.0, 1.0, 1.0, 1.0],
            white,
            &layout,
        ));
        Ok(materials)
    }

    async fn load_image(
        &self,
        image: &gltf::Image<'_>,
        base: &str,
        buffers: &[Vec<u8>],
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<Texture> {
        let label = image.name().unwrap_or("image");
        match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                if mime_type == KTX2_MIME_TYPE {
                    return Ok(self.ktx2_fallback(label, device, queue));
                }
                let buffer = buffers
                    .get(view.buffer().index())
                    .context("Image references a missing buffer")?;
                let bytes = buffer
                    .get(view.offset()..view.offset() + view.length())
                    .context("Image view exceeds its buffer")?;
                Texture::from_bytes(device, queue, bytes, label, Some(mime_type))
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                if mime_type == Some(KTX2_MIME_TYPE) || uri.ends_with(".ktx2") {
                    return Ok(self.ktx2_fallback(label, device, queue));
                }
                let bytes = self.load_uri(base, uri).await?;
                Texture::from_bytes(device, queue, &bytes, label, mime_type)
            }
        }
    }

    fn ktx2_fallback(&self, label: &str, device: &wgpu::Device, queue: &wgpu::Queue) -> Texture {
        match &self.ktx2 {
            Some(ktx2) => log::warn!(
                "KTX2 image {} is not transcoded (transcoder at {}, target {:?}); using a flat texture",
                label,
                ktx2.transcoder_path(),
                ktx2.transcode_target()
            ),
            None => log::warn!(
                "KTX2 image {} found but no KTX2 loader is configured; using a flat texture",
                label
            ),
        }
        Texture::white(device, queue)
    }
}

/// The image `texture` samples, `None` if its source index is dangling.
fn texture_image<'a>(document: &'a gltf::Document, texture: &gltf::Texture<'a>) -> Option<gltf::Image<'a>> {
    let source = document.as_json().textures.get(texture.index())?.source.value();
    document.images().nth(source)
}

/// Point textures whose only image comes through `KHR_texture_basisu` at
/// that image. Textures with a usable source keep it. Returns how many
/// textures changed.
pub fn redirect_basisu_sources(root: &mut gltf::json::Root) -> usize {
    let image_count = root.images.len();
    let mut redirected = 0;
    for texture in root.textures.iter_mut() {
        if texture.source.value() < image_count {
            continue;
        }
        let basisu_source = texture
            .extensions
            .as_ref()
            .and_then(|extensions| extensions.others.get(BASISU_EXTENSION))
            .and_then(|basisu| basisu.get("source"))
            .and_then(|source| source.as_u64())
            .and_then(|source| u32::try_from(source).ok())
            .filter(|source| (*source as usize) < image_count);
        if let Some(source) = basisu_source {
            texture.source = gltf::json::Index::new(source);
            redirected += 1;
        }
    }
    redirected
}

/// Geometry stored through an extension instead of plain accessors.
pub fn is_compressed(primitive: &gltf::Primitive<'_>) -> bool {
    primitive
        .get(&gltf::Semantic::Positions)
        .map(|positions| positions.view().is_none() && positions.sparse().is_none())
        .unwrap_or(true)
}

/// `Some` for `data:` URIs, holding the decoded payload.
pub fn decode_data_uri(uri: &str) -> Option<anyhow::Result<Vec<u8>>> {
    let rest = uri.strip_prefix("data:")?;
    let Some((header, payload)) = rest.split_once(',') else {
        return Some(Err(anyhow::anyhow!("Malformed data URI")));
    };
    if !header.ends_with(";base64") {
        return Some(Ok(payload.as_bytes().to_vec()));
    }
    Some(
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .context("Invalid base64 payload in data URI"),
    )
}

