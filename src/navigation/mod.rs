//! Drill-down navigation between region, postal area and building views.
//!
//! The navigator owns the current selection state and drives the whole
//! load pipeline: fetch-or-cache, the building/heat join, aggregation,
//! and layer replacement. Transitions are guarded by a cancellation
//! token so a selection that is overtaken by a newer one (or by a reset)
//! never commits stale layers or state.

use crate::aggregate::{summarize, AggregateSummary};
use crate::correlate::{correlate, JoinSpec};
use crate::feature::Feature;
use crate::layers::{Layer, LayerRegistry, MapSurface};
use crate::loader::FeatureLoader;
use crate::source::{AreaFilter, AsyncHttpClient, FeatureSource};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Attribute carrying a building's heat exposure after the join.
pub const HEAT_ATTRIBUTE: &str = "avgheatexposure";

/// Attribute carrying a building's registry identifier.
pub const BUILDING_ID_ATTRIBUTE: &str = "vtj_prt";

/// Depth of the drill-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavLevel {
    /// Whole capital region, postal area boundaries only
    #[default]
    Start,
    /// One postal area selected, its buildings loaded
    PostalCode,
    /// One building selected within the current postal area
    Building,
}

/// How area statistics are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Postal-area polygons
    #[default]
    CapitalRegion,
    /// Statistical grid cells
    Grid,
}

/// Per-transition choice of optional overlays.
///
/// A snapshot passed into each selection rather than registry state, so
/// two overlapping transitions cannot observe half-updated toggles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewToggles {
    /// Load the vegetation index overlay
    pub vegetation: bool,
    /// Load the urban sensor overlay
    pub sensors: bool,
}

/// Snapshot of where the user currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub level: NavLevel,
    pub selected_postal_code: Option<String>,
    pub selected_building_id: Option<String>,
    pub view_mode: ViewMode,
}

impl NavigationState {
    /// The start-of-session state: region view, nothing selected.
    pub fn initial() -> Self {
        Self {
            level: NavLevel::Start,
            selected_postal_code: None,
            selected_building_id: None,
            view_mode: ViewMode::default(),
        }
    }
}

/// Result of selecting a postal area.
#[derive(Debug, Clone)]
pub struct AreaSummary {
    pub postal_code: String,
    pub building_count: usize,
    /// Heat exposure over the area's buildings that carry a reading
    pub heat: AggregateSummary,
}

/// Result of selecting a single building.
#[derive(Debug, Clone)]
pub struct BuildingFocus {
    pub building_id: String,
    /// The building's own reading
    pub heat_exposure: f64,
    /// The surrounding area's statistics, for comparison
    pub area_baseline: AggregateSummary,
}

/// The sources the navigator draws from.
pub struct SourceSet {
    /// Postal area boundary polygons
    pub boundaries: Box<dyn FeatureSource>,
    /// Building footprints from the registry
    pub buildings: Box<dyn FeatureSource>,
    /// Per-building heat exposure readings
    pub heat: Box<dyn FeatureSource>,
    /// Vegetation index overlay
    pub vegetation: Box<dyn FeatureSource>,
    /// Urban sensor overlay
    pub sensors: Box<dyn FeatureSource>,
}

/// Drill-down navigator over the layer registry.
pub struct Navigator<C: AsyncHttpClient, M: MapSurface> {
    loader: FeatureLoader<C>,
    registry: LayerRegistry<M>,
    sources: SourceSet,
    join: JoinSpec,
    state: Mutex<NavigationState>,
    transition: Mutex<CancellationToken>,
}

impl<C: AsyncHttpClient, M: MapSurface> Navigator<C, M> {
    /// Creates a navigator in the initial state.
    pub fn new(loader: FeatureLoader<C>, registry: LayerRegistry<M>, sources: SourceSet) -> Self {
        Self {
            loader,
            registry,
            sources,
            join: JoinSpec::building_heat(),
            state: Mutex::new(NavigationState::initial()),
            transition: Mutex::new(CancellationToken::new()),
        }
    }

    /// The current navigation state.
    pub fn state(&self) -> NavigationState {
        self.state.lock().expect("navigation state lock poisoned").clone()
    }

    /// The layer registry backing this navigator.
    pub fn registry(&self) -> &LayerRegistry<M> {
        &self.registry
    }

    /// Cancels any in-flight transition and arms a token for a new one.
    fn begin_transition(&self) -> CancellationToken {
        let mut current = self.transition.lock().expect("transition lock poisoned");
        current.cancel();
        *current = CancellationToken::new();
        current.clone()
    }

    /// Drills into a postal area.
    ///
    /// Loads the area's buildings and heat readings concurrently, joins
    /// them, replaces the per-area layers, and moves the state machine to
    /// [`NavLevel::PostalCode`]. Returns `None` when the transition was
    /// overtaken by a newer one or when the building data could not be
    /// obtained; in the overtaken case nothing is committed.
    pub async fn select_postal_code(
        &self,
        postal_code: &str,
        toggles: ViewToggles,
    ) -> Option<AreaSummary> {
        let token = self.begin_transition();
        let filter = AreaFilter::PostalCode(postal_code.to_string());
        info!(postal_code = postal_code, "selecting postal area");

        // Drop the previous area's layers before loading the new one.
        self.remove_area_layers().await;
        if token.is_cancelled() {
            debug!(postal_code = postal_code, "selection overtaken during layer removal");
            return None;
        }

        let (buildings, heat) = tokio::join!(
            self.loader.load_source(self.sources.buildings.as_ref(), &filter),
            self.loader.load_source(self.sources.heat.as_ref(), &filter),
        );

        let buildings = match buildings {
            Some(collection) => collection,
            None => {
                warn!(postal_code = postal_code, "no building data for area");
                return None;
            }
        };

        let building_count = buildings.len();

        // A missing heat source degrades to buildings without readings.
        let merged = match heat {
            Some(heat) => correlate(&buildings, &heat, &self.join),
            None => {
                warn!(postal_code = postal_code, "no heat data, showing buildings plain");
                buildings
            }
        };

        let overlays = self.load_overlays(&filter, toggles).await;

        if token.is_cancelled() {
            debug!(postal_code = postal_code, "selection overtaken, discarding result");
            return None;
        }

        let heat_summary = summarize(&merged.features, HEAT_ATTRIBUTE);

        if let Err(err) = self.registry.add(Layer::new(merged.layer_name.clone(), merged)) {
            warn!(error = %err, "building layer collision");
            return None;
        }
        for overlay in overlays {
            if let Err(err) = self.registry.add(Layer::new(overlay.layer_name.clone(), overlay)) {
                warn!(error = %err, "overlay layer collision");
            }
        }

        let mut state = self.state.lock().expect("navigation state lock poisoned");
        state.level = NavLevel::PostalCode;
        state.selected_postal_code = Some(postal_code.to_string());
        state.selected_building_id = None;
        drop(state);

        info!(
            postal_code = postal_code,
            buildings = building_count,
            readings = heat_summary.count(),
            "postal area loaded"
        );
        Some(AreaSummary {
            postal_code: postal_code.to_string(),
            building_count,
            heat: heat_summary,
        })
    }

    /// Focuses a single building within the current postal area.
    ///
    /// Purely in-memory: reads the already loaded building layer. Returns
    /// `None` when no area is selected, the building is not in it, or the
    /// building carries no heat reading - only enriched features are
    /// focusable.
    pub fn select_building(&self, building_id: &str) -> Option<BuildingFocus> {
        let postal_code = {
            let state = self.state.lock().expect("navigation state lock poisoned");
            state.selected_postal_code.clone()?
        };

        let filter = AreaFilter::PostalCode(postal_code);
        let layer_name = self.sources.buildings.layer_name(&filter);
        let layer = self.registry.find_by_name(&layer_name)?;

        let building = layer
            .collection
            .features
            .iter()
            .find(|feature| feature_id_matches(feature, building_id))?;
        let heat_exposure = building.numeric_attribute(HEAT_ATTRIBUTE)?;
        let area_baseline = summarize(&layer.collection.features, HEAT_ATTRIBUTE);

        let mut state = self.state.lock().expect("navigation state lock poisoned");
        state.level = NavLevel::Building;
        state.selected_building_id = Some(building_id.to_string());
        drop(state);

        debug!(building_id = building_id, "building focused");
        Some(BuildingFocus {
            building_id: building_id.to_string(),
            heat_exposure,
            area_baseline,
        })
    }

    /// Returns to the region view.
    ///
    /// Cancels any in-flight selection, clears every layer and restores
    /// the postal area boundaries.
    pub async fn reset(&self) {
        let token = self.begin_transition();
        info!("resetting to region view");

        self.registry.remove_all().await;

        let boundaries = self
            .loader
            .load_source(self.sources.boundaries.as_ref(), &AreaFilter::Region)
            .await;

        if token.is_cancelled() {
            debug!("reset overtaken, discarding boundary layer");
            return;
        }

        if let Some(collection) = boundaries {
            if let Err(err) = self.registry.add(Layer::new(collection.layer_name.clone(), collection)) {
                warn!(error = %err, "boundary layer collision");
            }
        } else {
            warn!("no boundary data, region view is empty");
        }

        let mut state = self.state.lock().expect("navigation state lock poisoned");
        *state = NavigationState::initial();
    }

    /// Switches between region and grid presentation.
    pub fn set_view_mode(&self, mode: ViewMode) {
        let mut state = self.state.lock().expect("navigation state lock poisoned");
        state.view_mode = mode;
    }

    /// Removes the per-area layers, leaving region-wide ones in place.
    async fn remove_area_layers(&self) {
        for prefix in [
            self.sources.buildings.layer_prefix(),
            self.sources.vegetation.layer_prefix(),
            self.sources.sensors.layer_prefix(),
        ] {
            self.registry.remove_by_prefix(prefix).await;
        }
    }

    /// Loads the toggled-on overlays; failures shrink the result.
    async fn load_overlays(
        &self,
        filter: &AreaFilter,
        toggles: ViewToggles,
    ) -> Vec<crate::feature::FeatureCollection> {
        let mut overlays = Vec::new();
        if toggles.vegetation {
            if let Some(collection) = self.loader.load_source(self.sources.vegetation.as_ref(), filter).await {
                overlays.push(collection);
            }
        }
        if toggles.sensors {
            if let Some(collection) = self.loader.load_source(self.sources.sensors.as_ref(), filter).await {
                overlays.push(collection);
            }
        }
        overlays
    }
}

fn feature_id_matches(feature: &Feature, building_id: &str) -> bool {
    feature
        .attribute(BUILDING_ID_ATTRIBUTE)
        .and_then(|value| value.as_str())
        .is_some_and(|id| id == building_id)
}
