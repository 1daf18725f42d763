//! Reference images the tracking session is asked to detect.

use serde::{Deserialize, Serialize};

use crate::storage::Config;

/// A known image, with its real-world size in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub name: String,
    #[serde(default = "default_group")]
    pub group: String,
    pub physical_width: f64,
    pub physical_height: f64,
}

pub(crate) fn default_group() -> String {
    "AR Resources".into()
}

/// The detection images for one session run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceImageSet {
    images: Vec<ReferenceImage>,
}

impl ReferenceImageSet {
    pub fn new(images: Vec<ReferenceImage>) -> Self {
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceImage> {
        self.images.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ReferenceImage> {
        self.images.iter().find(|image| image.name == name)
    }
}

/// Source of reference image groups (an asset catalog on device).
pub trait ReferenceImageCatalog {
    /// `None` when the group does not exist at all.
    fn reference_images(&self, group: &str) -> Option<ReferenceImageSet>;
}

/// Catalog backed by the `[[reference_images]]` config entries.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    images: Vec<ReferenceImage>,
}

impl StaticCatalog {
    pub fn new(images: Vec<ReferenceImage>) -> Self {
        Self { images }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.reference_images.clone())
    }
}

impl ReferenceImageCatalog for StaticCatalog {
    fn reference_images(&self, group: &str) -> Option<ReferenceImageSet> {
        let images: Vec<_> = self
            .images
            .iter()
            .filter(|image| image.group == group)
            .cloned()
            .collect();
        if images.is_empty() {
            None
        } else {
            Some(ReferenceImageSet::new(images))
        }
    }
}
