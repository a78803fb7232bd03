use std::path::{Path, PathBuf};

use dynasurf::{
    options::Options,
    scene::{helix_bundle, HelixParams, PointSet},
    viewer::Viewer,
};

fn load_options(arg: Option<String>) -> Options {
    let Some(path) = arg else {
        return Options::default();
    };
    match Options::load(Path::new(&path)) {
        Ok(options) => {
            log::info!("loaded preset {path}");
            options
        }
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let options = load_options(std::env::args().nth(1));
    let textures = std::env::var_os("DYNASURF_TEXTURES")
        .map_or_else(|| PathBuf::from("assets/textures"), PathBuf::from);

    let scene = helix_bundle(&HelixParams::default(), &mut rand::rng());
    log::info!(
        "synthetic bundle: {} timestep(s), {} points each",
        scene.timestep_count(),
        scene.timestep(0).map_or(0, PointSet::len)
    );

    let result = Viewer::builder()
        .with_scene(scene)
        .with_options(options)
        .with_textures(textures)
        .build()
        .run();
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
