use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use orbit_scene::{
    config::{
        DRACO_DECODER_LOCATION, KTX2_TRANSCODER_LOCATION, RENDERER_REVISION, versioned_transcoder_path,
    },
    resources::{
        is_remote,
        loader::{
            AssetCache, BASISU_EXTENSION, DRACO_EXTENSION, DecoderType, DracoLoader, GltfLoader,
            Ktx2Loader, TextureSupport, TranscodeTarget, decode_data_uri,
        },
        resolve_uri,
    },
};

#[test]
fn should_default_to_versioned_draco_js_decoder() {
    let draco = DracoLoader::new();
    assert_eq!(draco.decoder_path(), DRACO_DECODER_LOCATION);
    assert_eq!(draco.decoder_type(), DecoderType::Js);
    assert_eq!(
        draco.decoder_files(),
        vec!["https://www.gstatic.com/draco/versioned/decoders/1.4.1/draco_decoder.js"]
    );
}

#[test]
fn should_name_wasm_decoder_files() {
    let mut draco = DracoLoader::new();
    draco
        .set_decoder_path("/draco")
        .set_decoder_config(DecoderType::Wasm);
    assert_eq!(
        draco.decoder_files(),
        vec!["/draco/draco_wasm_wrapper.js", "/draco/draco_decoder.wasm"]
    );
}

#[test]
fn should_build_transcoder_path_from_revision() {
    assert_eq!(
        versioned_transcoder_path("160"),
        "https://unpkg.com/three@0.160.x/examples/jsm/libs/basis/"
    );
    assert!(versioned_transcoder_path(RENDERER_REVISION).contains(RENDERER_REVISION));
}

#[test]
fn should_name_transcoder_files() {
    let mut ktx2 = Ktx2Loader::new();
    assert_eq!(ktx2.transcoder_path(), KTX2_TRANSCODER_LOCATION);
    ktx2.set_transcoder_path(versioned_transcoder_path("160"));
    assert_eq!(
        ktx2.transcoder_files(),
        vec![
            "https://unpkg.com/three@0.160.x/examples/jsm/libs/basis/basis_transcoder.js",
            "https://unpkg.com/three@0.160.x/examples/jsm/libs/basis/basis_transcoder.wasm",
        ]
    );
}

#[test]
fn should_prefer_astc_then_bc_then_etc2() {
    let all = TextureSupport {
        astc: true,
        bc: true,
        etc2: true,
    };
    assert_eq!(all.transcode_target(), TranscodeTarget::Astc4x4);
    let desktop = TextureSupport {
        bc: true,
        etc2: true,
        ..Default::default()
    };
    assert_eq!(desktop.transcode_target(), TranscodeTarget::Bc7);
    let mobile = TextureSupport {
        etc2: true,
        ..Default::default()
    };
    assert_eq!(mobile.transcode_target(), TranscodeTarget::Etc2);
    assert_eq!(TextureSupport::default().transcode_target(), TranscodeTarget::Rgba8);
}

#[test]
fn should_read_support_from_device_features() {
    let support = TextureSupport::from_features(
        wgpu::Features::TEXTURE_COMPRESSION_BC | wgpu::Features::TEXTURE_COMPRESSION_ETC2,
    );
    assert_eq!(
        support,
        TextureSupport {
            astc: false,
            bc: true,
            etc2: true
        }
    );
}

#[test]
fn should_have_no_transcode_target_before_detection() {
    let mut ktx2 = Ktx2Loader::new();
    assert_eq!(ktx2.transcode_target(), None);
    ktx2.with_support(TextureSupport {
        etc2: true,
        ..Default::default()
    });
    assert_eq!(ktx2.transcode_target(), Some(TranscodeTarget::Etc2));
}

#[test]
fn should_require_plugins_for_compressed_extensions() {
    let bare = GltfLoader::new();
    assert!(bare.check_required_extensions([DRACO_EXTENSION]).is_err());
    assert!(bare.check_required_extensions([BASISU_EXTENSION]).is_err());

    let mut configured = GltfLoader::new();
    configured
        .set_draco_loader(DracoLoader::new())
        .set_ktx2_loader(Ktx2Loader::new());
    assert!(
        configured
            .check_required_extensions([DRACO_EXTENSION, BASISU_EXTENSION])
            .is_ok()
    );
}

#[test]
fn should_tolerate_cosmetic_extensions_and_reject_unknown_ones() {
    let loader = GltfLoader::new();
    assert!(loader.check_required_extensions(std::iter::empty::<&str>()).is_ok());
    assert!(
        loader
            .check_required_extensions(["KHR_materials_unlit", "KHR_texture_transform"])
            .is_ok()
    );
    let err = loader
        .check_required_extensions(["EXT_meshopt_compression"])
        .expect_err("unknown extension");
    assert!(err.to_string().contains("EXT_meshopt_compression"));
}

#[test]
fn should_decode_data_uris() {
    let decoded = decode_data_uri("data:application/octet-stream;base64,AAEC")
        .expect("is a data uri")
        .expect("valid base64");
    assert_eq!(decoded, vec![0, 1, 2]);

    let plain = decode_data_uri("data:text/plain,hi").expect("is a data uri");
    assert_eq!(plain.expect("plain payload"), b"hi".to_vec());

    assert!(decode_data_uri("data:application/octet-stream;base64,***").expect("is a data uri").is_err());
    assert!(decode_data_uri("data:no-comma").expect("is a data uri").is_err());
    assert!(decode_data_uri("model.bin").is_none());
}

#[test]
fn should_resolve_relative_uris() {
    assert_eq!(
        resolve_uri("https://example.com/models/scene.gltf", "scene.bin").expect("joins"),
        "https://example.com/models/scene.bin"
    );
    assert_eq!(
        resolve_uri("https://example.com/models/scene.gltf", "../textures/a.png").expect("joins"),
        "https://example.com/textures/a.png"
    );
    assert_eq!(resolve_uri("models/scene.gltf", "scene.bin").expect("joins"), "models/scene.bin");
    assert_eq!(resolve_uri("scene.gltf", "scene.bin").expect("joins"), "scene.bin");
    assert_eq!(
        resolve_uri("models/scene.gltf", "https://cdn.example.com/a.bin").expect("absolute"),
        "https://cdn.example.com/a.bin"
    );
}

#[test]
fn should_tell_remote_from_local_locations() {
    assert!(is_remote("https://example.com/a.glb"));
    assert!(is_remote("http://localhost:8080/a.glb"));
    assert!(!is_remote("a.glb"));
}

#[test]
fn should_fetch_each_location_once() {
    let cache = AssetCache::new();
    let fetches = Arc::new(AtomicUsize::new(0));
    let fetch = |fetches: Arc<AtomicUsize>| {
        move |location: String| async move {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(location.into_bytes())
        }
    };

    let first = futures::executor::block_on(cache.fetch_with("a.glb", fetch(fetches.clone())))
        .expect("fetch succeeds");
    let second = futures::executor::block_on(cache.fetch_with("a.glb", fetch(fetches.clone())))
        .expect("cache hit");

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.as_slice(), b"a.glb");
    assert!(cache.contains("a.glb"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn should_not_cache_failed_fetches() {
    let cache = AssetCache::new();

    let failed = futures::executor::block_on(
        cache.fetch_with("b.glb", |_| async { Err(anyhow::anyhow!("offline")) }),
    );
    assert!(failed.is_err());
    assert!(cache.is_empty());

    let retried = futures::executor::block_on(
        cache.fetch_with("b.glb", |_| async { Ok(vec![1, 2, 3]) }),
    );
    assert_eq!(retried.expect("second attempt").as_slice(), &[1, 2, 3]);
}

#[test]
fn should_share_cache_between_loader_clones() {
    let cache = Arc::new(AssetCache::new());
    let loader = GltfLoader::new().with_cache(cache.clone());
    let clone = loader.clone();
    assert!(Arc::ptr_eq(loader.cache(), clone.cache()));
    assert!(Arc::ptr_eq(loader.cache(), &cache));
}
