//! Named layer registry over the rendering surface.
//!
//! The registry is the owner of loaded feature collections: a collection
//! lives exactly as long as its layer. The map itself is out of scope and
//! reached only through [`MapSurface`], whose removals may be deferred by
//! the underlying renderer - which is why prefix removal is asynchronous
//! and joins every pending detach before resolving.

use crate::feature::FeatureCollection;
use futures::future::join_all;
use std::future::Future;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// Layer-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayerError {
    /// A layer with this name is already present
    #[error("layer {0:?} already present")]
    DuplicateName(String),
}

/// Rendering collaborator seam.
///
/// `detach` asks the renderer to drop the visual primitives of a layer;
/// the future resolves once the renderer has actually let go, so a
/// same-named layer can be attached immediately afterwards without a
/// duplicate on screen.
pub trait MapSurface: Send + Sync {
    /// Detaches one layer's primitives from the map.
    fn detach(&self, layer_name: &str) -> impl Future<Output = ()> + Send;
}

/// Surface that drops detach requests on the floor.
///
/// Used when no renderer is attached (headless runs, tests that do not
/// assert on removal order).
#[derive(Debug, Clone, Default)]
pub struct NoopSurface;

impl MapSurface for NoopSurface {
    async fn detach(&self, _layer_name: &str) {}
}

/// A named, independently show/hide-able group of features.
///
/// A layer is either absent from the registry, present-and-visible, or
/// present-and-hidden; there is no partial loading state.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Unique display name, e.g. `"Buildings 00100"`
    pub name: String,
    /// Whether the renderer should draw this layer
    pub visible: bool,
    /// Whether the layer lies inside the focus region (passed through to
    /// the renderer, which dims out-of-region features)
    pub in_region: bool,
    /// The features this layer displays
    pub collection: FeatureCollection,
}

impl Layer {
    /// Creates a visible, in-region layer owning the collection.
    pub fn new(name: impl Into<String>, collection: FeatureCollection) -> Self {
        Self {
            name: name.into(),
            visible: true,
            in_region: true,
            collection,
        }
    }

    /// Builder-style out-of-region marker.
    pub fn out_of_region(mut self) -> Self {
        self.in_region = false;
        self
    }
}

/// Registry of currently loaded layers.
pub struct LayerRegistry<M: MapSurface> {
    surface: M,
    layers: Mutex<Vec<Layer>>,
}

impl<M: MapSurface> LayerRegistry<M> {
    /// Creates an empty registry over the given surface.
    pub fn new(surface: M) -> Self {
        Self {
            surface,
            layers: Mutex::new(Vec::new()),
        }
    }

    /// Adds a layer.
    ///
    /// Fails if a layer with the same name is already present; remove it
    /// first (and await the removal) to replace it.
    pub fn add(&self, layer: Layer) -> Result<(), LayerError> {
        let mut layers = self.layers.lock().expect("layer registry lock poisoned");
        if layers.iter().any(|existing| existing.name == layer.name) {
            return Err(LayerError::DuplicateName(layer.name));
        }
        debug!(layer = %layer.name, features = layer.collection.len(), "layer added");
        layers.push(layer);
        Ok(())
    }

    /// Returns a clone of the named layer, if present.
    pub fn find_by_name(&self, name: &str) -> Option<Layer> {
        let layers = self.layers.lock().expect("layer registry lock poisoned");
        layers.iter().find(|layer| layer.name == name).cloned()
    }

    /// Returns true if the named layer is present.
    pub fn contains(&self, name: &str) -> bool {
        let layers = self.layers.lock().expect("layer registry lock poisoned");
        layers.iter().any(|layer| layer.name == name)
    }

    /// Marks the named layer visible. Returns false if it is absent.
    pub fn show(&self, name: &str) -> bool {
        self.set_visibility(name, true)
    }

    /// Marks the named layer hidden. Returns false if it is absent.
    pub fn hide(&self, name: &str) -> bool {
        self.set_visibility(name, false)
    }

    fn set_visibility(&self, name: &str, visible: bool) -> bool {
        let mut layers = self.layers.lock().expect("layer registry lock poisoned");
        match layers.iter_mut().find(|layer| layer.name == name) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Removes every layer whose name starts with `prefix`.
    ///
    /// Fans out one detach per matching layer and waits for all of them
    /// to complete before dropping the registry entries, so a same-named
    /// `add` immediately afterwards cannot race a deferred removal.
    ///
    /// Only the layers present at entry are removed: a matching layer
    /// added while a detach is in flight was never detached and stays.
    pub async fn remove_by_prefix(&self, prefix: &str) {
        let names: Vec<String> = {
            let layers = self.layers.lock().expect("layer registry lock poisoned");
            layers
                .iter()
                .filter(|layer| layer.name.starts_with(prefix))
                .map(|layer| layer.name.clone())
                .collect()
        };

        if names.is_empty() {
            return;
        }

        join_all(names.iter().map(|name| self.surface.detach(name))).await;

        let mut layers = self.layers.lock().expect("layer registry lock poisoned");
        layers.retain(|layer| !names.iter().any(|name| *name == layer.name));
        debug!(prefix = prefix, removed = names.len(), "layers removed");
    }

    /// Removes every layer.
    pub async fn remove_all(&self) {
        self.remove_by_prefix("").await;
    }

    /// Names of all present layers, in insertion order.
    pub fn layer_names(&self) -> Vec<String> {
        let layers = self.layers.lock().expect("layer registry lock poisoned");
        layers.iter().map(|layer| layer.name.clone()).collect()
    }

    /// Number of present layers.
    pub fn len(&self) -> usize {
        let layers = self.layers.lock().expect("layer registry lock poisoned");
        layers.len()
    }

    /// Returns true if no layer is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Surface that records detached names, optionally after a delay so
    /// tests can prove removals are actually awaited.
    #[derive(Clone, Default)]
    struct RecordingSurface {
        detached: Arc<Mutex<Vec<String>>>,
        delay_ms: u64,
    }

    impl RecordingSurface {
        fn with_delay(delay_ms: u64) -> Self {
            Self {
                detached: Arc::new(Mutex::new(Vec::new())),
                delay_ms,
            }
        }

        fn detached_names(&self) -> Vec<String> {
            self.detached.lock().unwrap().clone()
        }
    }

    impl MapSurface for RecordingSurface {
        async fn detach(&self, layer_name: &str) {
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            self.detached.lock().unwrap().push(layer_name.to_string());
        }
    }

    fn layer(name: &str) -> Layer {
        Layer::new(name, FeatureCollection::new(name, "http://example.fi"))
    }

    #[test]
    fn test_add_and_find() {
        let registry = LayerRegistry::new(NoopSurface);
        registry.add(layer("Buildings 00100")).unwrap();

        let found = registry.find_by_name("Buildings 00100").unwrap();
        assert!(found.visible);
        assert!(found.in_region);
        assert!(registry.find_by_name("Vegetation 00100").is_none());
    }

    #[test]
    fn test_add_duplicate_name_fails() {
        let registry = LayerRegistry::new(NoopSurface);
        registry.add(layer("Buildings 00100")).unwrap();

        let err = registry.add(layer("Buildings 00100")).unwrap_err();
        assert_eq!(err, LayerError::DuplicateName("Buildings 00100".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_show_and_hide() {
        let registry = LayerRegistry::new(NoopSurface);
        registry.add(layer("Vegetation 00100")).unwrap();

        assert!(registry.hide("Vegetation 00100"));
        assert!(!registry.find_by_name("Vegetation 00100").unwrap().visible);

        assert!(registry.show("Vegetation 00100"));
        assert!(registry.find_by_name("Vegetation 00100").unwrap().visible);

        assert!(!registry.show("Missing"));
        assert!(!registry.hide("Missing"));
    }

    #[tokio::test]
    async fn test_remove_by_prefix_removes_all_matches() {
        let surface = RecordingSurface::default();
        let registry = LayerRegistry::new(surface.clone());
        registry.add(layer("Buildings 00100")).unwrap();
        registry.add(layer("Buildings 00120")).unwrap();
        registry.add(layer("Vegetation 00100")).unwrap();

        registry.remove_by_prefix("Buildings").await;

        assert_eq!(registry.layer_names(), vec!["Vegetation 00100"]);
        let mut detached = surface.detached_names();
        detached.sort();
        assert_eq!(detached, vec!["Buildings 00100", "Buildings 00120"]);
    }

    #[tokio::test]
    async fn test_remove_then_immediate_add_does_not_collide() {
        // The detach is deferred by the surface; add must still succeed
        // because remove_by_prefix waits for it.
        let surface = RecordingSurface::with_delay(20);
        let registry = LayerRegistry::new(surface);
        registry.add(layer("Vegetation 00100")).unwrap();

        registry.remove_by_prefix("Vegetation").await;
        registry.add(layer("Vegetation 00100")).unwrap();

        assert_eq!(registry.layer_names(), vec!["Vegetation 00100"]);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_layer_added_during_removal_survives() {
        // A matching layer added while the detaches are in flight was
        // never collected, so the removal must leave it alone.
        let surface = RecordingSurface::with_delay(40);
        let registry = Arc::new(LayerRegistry::new(surface.clone()));
        registry.add(layer("Buildings 00100")).unwrap();

        let removal = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.remove_by_prefix("Buildings").await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        registry.add(layer("Buildings 00140")).unwrap();
        removal.await.unwrap();

        assert!(!registry.contains("Buildings 00100"));
        assert!(registry.contains("Buildings 00140"));
        assert_eq!(surface.detached_names(), vec!["Buildings 00100"]);
    }

    #[tokio::test]
    async fn test_remove_by_prefix_without_matches_is_noop() {
        let surface = RecordingSurface::default();
        let registry = LayerRegistry::new(surface.clone());
        registry.add(layer("Buildings 00100")).unwrap();

        registry.remove_by_prefix("Sensors").await;

        assert_eq!(registry.len(), 1);
        assert!(surface.detached_names().is_empty());
    }

    #[tokio::test]
    async fn test_remove_all() {
        let registry = LayerRegistry::new(NoopSurface);
        registry.add(layer("PostalAreas")).unwrap();
        registry.add(layer("Buildings 00100")).unwrap();

        registry.remove_all().await;

        assert!(registry.is_empty());
    }

    #[test]
    fn test_out_of_region_builder() {
        let l = layer("Buildings 00100").out_of_region();
        assert!(!l.in_region);
    }
}
