use ahash::AHashMap;
use parking_lot::RwLock;
use std::{collections::HashMap, hash::BuildHasher, sync::Arc};

/// Looks up the size of a container image, in bytes.
///
/// `None` means the size is unknown; an unknown size is never a violation.
pub trait ImageSizes: Send + Sync {
    fn get(&self, image: &str) -> Option<u64>;
}

/// An in-memory image size cache that may be shared between a writer and
/// concurrent scans.
#[derive(Clone, Debug, Default)]
pub struct SharedImageSizes(Arc<RwLock<AHashMap<String, u64>>>);

// === impl SharedImageSizes ===

impl SharedImageSizes {
    pub fn insert(&self, image: impl Into<String>, size: u64) {
        self.0.write().insert(image.into(), size);
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

impl ImageSizes for SharedImageSizes {
    fn get(&self, image: &str) -> Option<u64> {
        self.0.read().get(image).copied()
    }
}

impl<S: Into<String>> Extend<(S, u64)> for SharedImageSizes {
    fn extend<T: IntoIterator<Item = (S, u64)>>(&mut self, iter: T) {
        let mut sizes = self.0.write();
        sizes.extend(iter.into_iter().map(|(image, size)| (image.into(), size)));
    }
}

// === impl ImageSizes ===

impl<S: BuildHasher + Send + Sync> ImageSizes for HashMap<String, u64, S> {
    fn get(&self, image: &str) -> Option<u64> {
        HashMap::get(self, image).copied()
    }
}

impl<T: ImageSizes + ?Sized> ImageSizes for &T {
    fn get(&self, image: &str) -> Option<u64> {
        (**self).get(image)
    }
}

impl<T: ImageSizes + ?Sized> ImageSizes for Arc<T> {
    fn get(&self, image: &str) -> Option<u64> {
        (**self).get(image)
    }
}
