use orbit_scene::{config::SceneConfig, scene};

fn main() -> anyhow::Result<()> {
    scene::run(SceneConfig::default())
}
