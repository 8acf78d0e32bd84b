#![allow(dead_code)]

use std::path::PathBuf;

pub fn asset_dir(sub: &str) -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.push("asm");
    dir.push(sub);
    dir
}

pub fn read_asset(sub: &str, name: &str) -> String {
    let path = asset_dir(sub).join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("could not read '{}': {}", path.display(), err))
}

/// A fresh, empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("asm16-{}-{}", name, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
