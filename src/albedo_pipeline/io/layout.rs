use std::path::{Path, PathBuf};

use crate::albedo_pipeline::io::writer::AlbedoFormat;

const PROBE_DIR: &str = "probes";

/// File naming of one scene directory in the multi-illumination dataset
#[derive(Debug, Clone)]
pub struct SceneLayout {
    scene_dir: PathBuf,
    name: String,
}

impl SceneLayout {
    pub fn new<P: AsRef<Path>>(root: P, scene_name: &str) -> Self {
        Self {
            scene_dir: root.as_ref().join(scene_name),
            name: scene_name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scene_dir(&self) -> &Path {
        &self.scene_dir
    }

    pub fn capture_path(&self, direction: usize) -> PathBuf {
        self.scene_dir.join(format!("dir_{}_mip2.exr", direction))
    }

    pub fn probe_path(&self, direction: usize) -> PathBuf {
        self.scene_dir
            .join(PROBE_DIR)
            .join(format!("dir_{}_gray256.exr", direction))
    }

    pub fn normalized_path(&self, direction: usize) -> PathBuf {
        self.scene_dir.join(format!("dir_{}_mip2.png", direction))
    }

    pub fn albedo_path(&self, format: AlbedoFormat) -> PathBuf {
        self.scene_dir.join(format!("albedo.{}", format.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_paths() {
        let layout = SceneLayout::new("/data/mid", "kitchen");

        assert_eq!(layout.name(), "kitchen");
        assert_eq!(layout.capture_path(3), Path::new("/data/mid/kitchen/dir_3_mip2.exr"));
        assert_eq!(layout.probe_path(12), Path::new("/data/mid/kitchen/probes/dir_12_gray256.exr"));
        assert_eq!(layout.normalized_path(0), Path::new("/data/mid/kitchen/dir_0_mip2.png"));
        assert_eq!(layout.albedo_path(AlbedoFormat::Exr), Path::new("/data/mid/kitchen/albedo.exr"));
        assert_eq!(layout.albedo_path(AlbedoFormat::Png), Path::new("/data/mid/kitchen/albedo.png"));
    }
}
