pub mod manifest;

pub use manifest::{read_manifest, write_manifest, ManifestStats};
