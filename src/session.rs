//! Session controller: owns the loaded data, the interaction state and the map
//! surface, and keeps the surface's paint and hover flags in sync with them.

use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::MapConfig,
    data::{CountyCollection, DataKind, DataSlot, Dataset, DemographicRecord, ElectionRecord, LoadError},
    interaction::{HoverChange, InteractionState},
    present::{CountyDetail, Legend},
    scale::{ColorMapping, ColorScale, build_scale},
    surface::{LayerSpec, MapSurface, PointerEvent, PointerKind},
    types::{Fips, Overlay},
};

/// Result of a repaint request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// Paint mapping sent, with this many keyed colors.
    Applied { colored: usize },
    /// Geometry has not arrived, so there is no layer to paint.
    AwaitingLayer,
    /// The active overlay's dataset is pending, failed or empty.
    AwaitingData,
}

impl PaintOutcome {
    pub fn to_str(&self) -> &'static str {
        match self {
            PaintOutcome::Applied { .. } => "applied",
            PaintOutcome::AwaitingLayer => "awaiting-layer",
            PaintOutcome::AwaitingData => "awaiting-data",
        }
    }
}

pub struct MapSession<S: MapSurface> {
    config: Arc<MapConfig>,
    surface: S,
    geometry: DataSlot<CountyCollection>,
    demographics: DataSlot<Dataset<DemographicRecord>>,
    elections: DataSlot<Dataset<ElectionRecord>>,
    state: InteractionState,
    layers_ready: bool,
    last_paint: PaintOutcome,
}

impl<S: MapSurface> MapSession<S> {
    pub fn new(config: Arc<MapConfig>, surface: S) -> Self {
        let state = InteractionState::new(config.default_overlay);
        Self {
            config,
            surface,
            geometry: DataSlot::Pending,
            demographics: DataSlot::Pending,
            elections: DataSlot::Pending,
            state,
            layers_ready: false,
            last_paint: PaintOutcome::AwaitingLayer,
        }
    }

    #[inline]
    pub fn config(&self) -> &MapConfig { &self.config }

    #[inline]
    pub fn state(&self) -> &InteractionState { &self.state }

    #[inline]
    pub fn surface(&self) -> &S { &self.surface }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut S { &mut self.surface }

    pub fn into_surface(self) -> S { self.surface }

    pub fn geometry(&self) -> &DataSlot<CountyCollection> { &self.geometry }

    pub fn demographics(&self) -> &DataSlot<Dataset<DemographicRecord>> { &self.demographics }

    pub fn elections(&self) -> &DataSlot<Dataset<ElectionRecord>> { &self.elections }

    #[inline]
    pub fn last_paint(&self) -> PaintOutcome { self.last_paint }

    /// Geometry load finished. On success the source is pushed, missing layers
    /// are added and pointer events are requested, then the map is repainted.
    pub fn set_geometry(&mut self, result: Result<CountyCollection, LoadError>) -> Result<PaintOutcome> {
        self.geometry = settle(DataKind::Geometry, result, CountyCollection::len);
        if let Some(geometry) = self.geometry.ready() {
            let surface = &self.config.surface;
            self.surface.set_source_data(&surface.source_id, geometry)?;

            for layer in [LayerSpec::fill(surface), LayerSpec::border(surface)] {
                if !self.surface.has_layer(&layer.id) {
                    self.surface.add_layer(&layer)?;
                }
            }

            if !self.layers_ready {
                for kind in PointerKind::ALL {
                    self.surface.on_pointer(&surface.fill_layer_id, kind)?;
                }
                self.layers_ready = true;
            }
        }
        self.repaint()
    }

    pub fn set_demographics(&mut self, result: Result<Dataset<DemographicRecord>, LoadError>) -> Result<PaintOutcome> {
        self.demographics = settle(DataKind::Demographics, result, Dataset::len);
        self.repaint()
    }

    pub fn set_elections(&mut self, result: Result<Dataset<ElectionRecord>, LoadError>) -> Result<PaintOutcome> {
        self.elections = settle(DataKind::Elections, result, Dataset::len);
        self.repaint()
    }

    /// Whether the active overlay's dataset has records to build a scale from.
    pub fn overlay_data_ready(&self) -> bool {
        match self.state.overlay() {
            Overlay::Election => !self.elections.records().is_empty(),
            _ => !self.demographics.records().is_empty(),
        }
    }

    /// Scale for the active overlay, if its data are available.
    pub fn scale(&self) -> Option<ColorScale> {
        self.overlay_data_ready()
            .then(|| build_scale(self.state.overlay(), self.demographics.records(), &self.config))
    }

    /// Rebuild the scale and send the color mapping for the active overlay.
    pub fn repaint(&mut self) -> Result<PaintOutcome> {
        let overlay = self.state.overlay();
        let outcome = if !self.layers_ready {
            PaintOutcome::AwaitingLayer
        } else if let Some(scale) = self.scale() {
            let mapping = ColorMapping::build(overlay, &scale, self.demographics.records(), self.elections.records());
            let surface = &self.config.surface;
            self.surface.set_paint_color_mapping(&surface.fill_layer_id, &surface.fill_property, &mapping)?;
            PaintOutcome::Applied { colored: mapping.len() }
        } else {
            PaintOutcome::AwaitingData
        };

        tracing::info!(
            target: "countymap::session",
            overlay = overlay.to_str(),
            outcome = outcome.to_str(),
            "repaint"
        );
        self.last_paint = outcome;
        Ok(outcome)
    }

    /// Switch the overlay and repaint. Selecting the active overlay again changes nothing.
    pub fn set_overlay(&mut self, overlay: Overlay) -> Result<PaintOutcome> {
        if !self.state.set_overlay(overlay) { return Ok(self.last_paint) }
        self.repaint()
    }

    /// Route a pointer event from the surface into the interaction state and
    /// mirror the hover change onto the surface. Events arriving before the
    /// layers exist, and move/click events without a FIPS, are ignored.
    /// If the surface rejects a hover flag, the hover state is rolled back so
    /// the next move retries the transition.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        if !self.layers_ready {
            tracing::debug!(target: "countymap::session", kind = event.kind.to_str(), "pointer event before layers; ignored");
            return Ok(());
        }

        match (event.kind, event.fips) {
            (PointerKind::Move, Some(fips)) => {
                let previous = self.state.clone();
                let change = self.state.hover(fips);
                self.apply_hover(previous, change)
            }
            (PointerKind::Leave, _) => {
                let previous = self.state.clone();
                let change = self.state.leave();
                self.apply_hover(previous, change)
            }
            (PointerKind::Click, Some(fips)) => {
                if self.state.click(fips.clone()) {
                    tracing::debug!(target: "countymap::session", fips = %fips, "selected");
                }
                Ok(())
            }
            (kind, None) => {
                tracing::debug!(target: "countymap::session", kind = kind.to_str(), "pointer event without feature id; ignored");
                Ok(())
            }
        }
    }

    /// Send a hover change to the surface. The state must track what the
    /// surface actually shows: a failed clear restores `previous`, a failed
    /// set leaves nothing hovered.
    fn apply_hover(&mut self, previous: InteractionState, change: HoverChange) -> Result<()> {
        if change.is_noop() { return Ok(()) }
        let source = &self.config.surface.source_id;
        if let Some(cleared) = &change.clear {
            if let Err(err) = self.surface.set_feature_hover_flag(source, cleared, false) {
                self.state = previous;
                return Err(err);
            }
        }
        if let Some(next) = &change.set {
            if let Err(err) = self.surface.set_feature_hover_flag(source, next, true) {
                self.state.leave();
                return Err(err);
            }
        }
        tracing::debug!(
            target: "countymap::session",
            clear = change.clear.as_ref().map(Fips::as_str),
            set = change.set.as_ref().map(Fips::as_str),
            "hover"
        );
        Ok(())
    }

    /// Returns whether a selection was cleared.
    pub fn clear_selection(&mut self) -> bool { self.state.clear_selection() }

    /// Legend for the active overlay; `None` while its data are unavailable.
    pub fn legend(&self) -> Option<Legend> {
        Legend::new(self.state.overlay(), &self.scale()?)
    }

    /// Sidebar for the displayed county (selection first, then hover).
    pub fn detail(&self) -> Option<CountyDetail> {
        let fips = self.state.display()?;
        Some(self.detail_for(fips.as_str()))
    }

    /// Sidebar for any county, joined across the three datasets by FIPS.
    pub fn detail_for(&self, fips: &str) -> CountyDetail {
        let demographics = self.demographics.lookup(fips);
        let election = self.elections.lookup(fips);
        let name = demographics.map(|r| r.name.as_str())
            .or_else(|| election.map(|r| r.name.as_str()))
            .or_else(|| self.geometry.ready().and_then(|g| g.get(fips)).map(|f| f.name.as_str()))
            .filter(|name| !name.is_empty())
            .unwrap_or(fips)
            .to_string();
        let selected = self.state.selected().is_some_and(|s| s.as_str() == fips);

        CountyDetail::new(Fips::from(fips), name, selected, demographics, election, &self.config.party_colors)
    }

    /// Resolve a FIPS code or a county name to the FIPS used by the datasets.
    pub fn resolve_county(&self, query: &str) -> Option<Fips> {
        let query = query.trim();
        if self.demographics.ready().is_some_and(|d| d.contains(query))
            || self.elections.ready().is_some_and(|d| d.contains(query))
            || self.geometry.ready().is_some_and(|g| g.get(query).is_some())
        {
            return Some(Fips::from(query));
        }

        let stripped = strip_county_suffix(query);
        self.demographics.ready().and_then(|d| d.find_by_name(stripped)).map(|r| r.fips.clone())
            .or_else(|| self.elections.ready().and_then(|d| d.find_by_name(stripped)).map(|r| r.fips.clone()))
            .or_else(|| {
                self.geometry.ready()?
                    .features().iter()
                    .find(|f| f.name.eq_ignore_ascii_case(stripped))
                    .and_then(|f| f.fips.clone())
            })
    }

    /// County under a lon/lat position, for hosts that report pointer
    /// coordinates instead of feature ids.
    pub fn county_at(&self, lon: f64, lat: f64) -> Option<Fips> {
        self.geometry.ready()?.feature_at(lon, lat)?.fips.clone()
    }

    /// Pointer event at a lon/lat position: a move or click over a county
    /// targets it, and a move off every county is a leave.
    pub fn handle_pointer_at(&mut self, kind: PointerKind, lon: f64, lat: f64) -> Result<()> {
        let event = match (kind, self.county_at(lon, lat)) {
            (PointerKind::Move, None) => PointerEvent::leave(),
            (kind, fips) => PointerEvent { kind, fips },
        };
        self.handle_pointer(event)
    }

    /// Failed loads, for a non-fatal error banner.
    pub fn load_errors(&self) -> Vec<&LoadError> {
        [self.geometry.error(), self.demographics.error(), self.elections.error()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Whether any of the three loads has not completed yet.
    pub fn is_loading(&self) -> bool {
        self.geometry.is_pending() || self.demographics.is_pending() || self.elections.is_pending()
    }
}

/// "Santa Cruz County" -> "Santa Cruz", ignoring case.
fn strip_county_suffix(name: &str) -> &str {
    const SUFFIX: &str = " county";
    match name.len().checked_sub(SUFFIX.len()) {
        Some(at) if name.is_char_boundary(at) && name[at..].eq_ignore_ascii_case(SUFFIX) => &name[..at],
        _ => name,
    }
}

/// Record a load completion, logging its outcome.
fn settle<T>(kind: DataKind, result: Result<T, LoadError>, len: impl Fn(&T) -> usize) -> DataSlot<T> {
    match &result {
        Ok(data) => tracing::info!(target: "countymap::load", kind = kind.to_str(), records = len(data), "loaded"),
        Err(err) => tracing::warn!(target: "countymap::load", kind = kind.to_str(), error = %err, "load failed; continuing without it"),
    }
    DataSlot::from_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{AgeDistribution, CountyFeature},
        surface::{RecordingSurface, SurfaceCall},
    };
    use geo::{MultiPolygon, polygon};

    fn county(fips: &str, name: &str, x: f64) -> CountyFeature {
        let shape = polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)];
        CountyFeature { fips: Some(Fips::from(fips)), name: name.to_string(), shape: MultiPolygon(vec![shape]) }
    }

    fn demographic(fips: &str, name: &str, population: u64) -> DemographicRecord {
        DemographicRecord {
            fips: Fips::from(fips),
            name: name.to_string(),
            population,
            median_income: 50_000,
            age_distribution: AgeDistribution::default(),
            housing_units: None,
            area_square_miles: None,
            population_density: None,
        }
    }

    fn session() -> MapSession<RecordingSurface> {
        MapSession::new(Arc::new(MapConfig::default()), RecordingSurface::new())
    }

    fn geometry() -> CountyCollection {
        CountyCollection::new(vec![county("04001", "Apache", 0.0), county("04003", "Cochise", 1.0)])
    }

    #[test]
    fn paints_only_when_layer_and_data_exist() {
        let mut session = session();
        assert!(session.is_loading());

        let demographics = Dataset::new(vec![demographic("04001", "Apache", 100), demographic("04003", "Cochise", 300)]);
        assert_eq!(session.set_demographics(Ok(demographics)).unwrap(), PaintOutcome::AwaitingLayer);
        assert!(session.surface().calls().is_empty());

        assert_eq!(session.set_geometry(Ok(geometry())).unwrap(), PaintOutcome::Applied { colored: 2 });
        let paint = session.surface().paint("counties-fill").unwrap();
        assert_eq!(paint.get("04001"), MapConfig::default().palettes.population[0]);
        assert_eq!(paint.get("04003"), MapConfig::default().palettes.population[4]);
    }

    #[test]
    fn geometry_installs_layers_once() {
        let mut session = session();
        session.set_geometry(Ok(geometry())).unwrap();
        session.set_geometry(Ok(geometry())).unwrap();

        let layers: Vec<_> = session.surface().layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(layers, ["counties-fill", "counties-border"]);
        assert_eq!(session.surface().subscriptions().len(), 3);
        let sources = session.surface().calls().iter()
            .filter(|c| matches!(c, SurfaceCall::SetSourceData { .. }))
            .count();
        assert_eq!(sources, 2);
    }

    #[test]
    fn existing_layers_are_not_added_again() {
        let surface = RecordingSurface::with_layers(["counties-fill", "counties-border"]);
        let mut session = MapSession::new(Arc::new(MapConfig::default()), surface);
        session.set_geometry(Ok(geometry())).unwrap();
        assert!(session.surface().layers().is_empty());
    }

    #[test]
    fn failed_load_is_not_fatal() {
        let mut session = session();
        session.set_geometry(Ok(geometry())).unwrap();
        let failure = LoadError::Fetch { kind: DataKind::Demographics, message: "404".into() };
        assert_eq!(session.set_demographics(Err(failure)).unwrap(), PaintOutcome::AwaitingData);
        assert_eq!(session.load_errors().len(), 1);
        assert!(session.legend().is_none());
        assert!(session.surface().paint("counties-fill").is_none());
    }

    #[test]
    fn pointer_before_layers_is_ignored() {
        let mut session = session();
        session.handle_pointer(PointerEvent::moved("04001")).unwrap();
        assert_eq!(session.state().hovered(), None);
        assert!(session.surface().calls().is_empty());
    }

    #[test]
    fn hover_sequence_emits_clear_then_set() {
        let mut session = session();
        session.set_geometry(Ok(geometry())).unwrap();
        session.surface_mut().take_calls();

        session.handle_pointer(PointerEvent::moved("04001")).unwrap();
        session.handle_pointer(PointerEvent::moved("04001")).unwrap();
        session.handle_pointer(PointerEvent::moved("04003")).unwrap();
        session.handle_pointer(PointerEvent::leave()).unwrap();
        session.handle_pointer(PointerEvent::leave()).unwrap();

        let a = Fips::from("04001");
        let b = Fips::from("04003");
        assert_eq!(
            session.surface().hover_calls(),
            vec![(a.clone(), true), (a, false), (b.clone(), true), (b, false)],
        );
        assert!(session.surface().hovered().is_empty());
    }

    #[test]
    fn move_without_fips_is_ignored() {
        let mut session = session();
        session.set_geometry(Ok(geometry())).unwrap();
        session.handle_pointer(PointerEvent { kind: PointerKind::Move, fips: None }).unwrap();
        session.handle_pointer(PointerEvent { kind: PointerKind::Click, fips: None }).unwrap();
        assert_eq!(session.state().display(), None);
        assert!(session.surface().hover_calls().is_empty());
    }

    #[test]
    fn detail_prefers_selection_and_joins_by_fips() {
        let mut session = session();
        session.set_geometry(Ok(geometry())).unwrap();
        session.set_demographics(Ok(Dataset::new(vec![demographic("04001", "Apache", 66_021)]))).unwrap();

        assert!(session.detail().is_none());
        session.handle_pointer(PointerEvent::moved("04003")).unwrap();
        let hovered = session.detail().unwrap();
        assert_eq!(hovered.name, "Cochise");
        assert!(hovered.demographics.is_none());

        session.handle_pointer(PointerEvent::click("04001")).unwrap();
        let selected = session.detail().unwrap();
        assert_eq!(selected.fips.as_str(), "04001");
        assert!(selected.selected);
        assert_eq!(selected.demographics.unwrap().population, "66,021");

        assert!(session.clear_selection());
        assert_eq!(session.detail().unwrap().fips.as_str(), "04003");
    }

    #[test]
    fn overlay_switch_repaints_once() {
        let mut session = session();
        session.set_geometry(Ok(geometry())).unwrap();
        session.set_demographics(Ok(Dataset::new(vec![demographic("04001", "Apache", 1)]))).unwrap();
        session.surface_mut().take_calls();

        assert_eq!(session.set_overlay(Overlay::Election).unwrap(), PaintOutcome::AwaitingData);
        assert_eq!(session.set_overlay(Overlay::Income).unwrap(), PaintOutcome::Applied { colored: 1 });
        assert_eq!(session.set_overlay(Overlay::Income).unwrap(), PaintOutcome::Applied { colored: 1 });
        assert_eq!(session.surface().calls().len(), 1);
    }

    /// Surface whose next `n` hover-flag calls with the given value fail.
    struct FlakySurface {
        inner: RecordingSurface,
        fail_hovered: bool,
        failures: usize,
    }

    impl MapSurface for FlakySurface {
        fn set_source_data(&mut self, source_id: &str, data: &CountyCollection) -> Result<()> {
            self.inner.set_source_data(source_id, data)
        }
        fn has_layer(&self, layer_id: &str) -> bool { self.inner.has_layer(layer_id) }
        fn add_layer(&mut self, layer: &LayerSpec) -> Result<()> { self.inner.add_layer(layer) }
        fn set_paint_color_mapping(&mut self, layer_id: &str, property: &str, mapping: &ColorMapping) -> Result<()> {
            self.inner.set_paint_color_mapping(layer_id, property, mapping)
        }
        fn set_feature_hover_flag(&mut self, source_id: &str, fips: &Fips, hovered: bool) -> Result<()> {
            if hovered == self.fail_hovered && self.failures > 0 {
                self.failures -= 1;
                anyhow::bail!("feature state rejected for {fips}");
            }
            self.inner.set_feature_hover_flag(source_id, fips, hovered)
        }
        fn on_pointer(&mut self, layer_id: &str, kind: PointerKind) -> Result<()> {
            self.inner.on_pointer(layer_id, kind)
        }
    }

    fn flaky_session(fail_hovered: bool) -> MapSession<FlakySurface> {
        let surface = FlakySurface { inner: RecordingSurface::new(), fail_hovered, failures: 0 };
        let mut session = MapSession::new(Arc::new(MapConfig::default()), surface);
        session.set_geometry(Ok(geometry())).unwrap();
        session
    }

    fn lit(session: &MapSession<FlakySurface>) -> Vec<&str> {
        session.surface().inner.hovered().into_iter().map(Fips::as_str).collect()
    }

    #[test]
    fn failed_clear_keeps_previous_hover_and_retries() {
        let mut session = flaky_session(false);
        session.handle_pointer(PointerEvent::moved("04001")).unwrap();

        session.surface_mut().failures = 1;
        assert!(session.handle_pointer(PointerEvent::moved("04003")).is_err());
        assert_eq!(session.state().hovered().map(Fips::as_str), Some("04001"));
        assert_eq!(lit(&session), ["04001"]);

        session.handle_pointer(PointerEvent::moved("04003")).unwrap();
        assert_eq!(session.state().hovered().map(Fips::as_str), Some("04003"));
        assert_eq!(lit(&session), ["04003"]);
    }

    #[test]
    fn failed_set_leaves_nothing_hovered() {
        let mut session = flaky_session(true);
        session.handle_pointer(PointerEvent::moved("04001")).unwrap();

        session.surface_mut().failures = 1;
        assert!(session.handle_pointer(PointerEvent::moved("04003")).is_err());
        assert_eq!(session.state().hovered(), None);
        assert!(lit(&session).is_empty());

        session.handle_pointer(PointerEvent::moved("04003")).unwrap();
        assert_eq!(lit(&session), ["04003"]);
    }

    #[test]
    fn pointer_position_resolves_through_geometry() {
        let mut session = session();
        assert_eq!(session.county_at(0.5, 0.5), None);
        session.set_geometry(Ok(geometry())).unwrap();

        assert_eq!(session.county_at(0.5, 0.5), Some(Fips::from("04001")));
        assert_eq!(session.county_at(1.5, 0.5), Some(Fips::from("04003")));
        assert_eq!(session.county_at(5.0, 5.0), None);

        session.handle_pointer_at(PointerKind::Move, 1.5, 0.5).unwrap();
        assert_eq!(session.state().hovered(), Some(&Fips::from("04003")));
        session.handle_pointer_at(PointerKind::Click, 0.5, 0.5).unwrap();
        assert_eq!(session.state().selected(), Some(&Fips::from("04001")));

        // Moving off the map is a leave; the selection stays.
        session.handle_pointer_at(PointerKind::Move, 5.0, 5.0).unwrap();
        assert_eq!(session.state().hovered(), None);
        assert_eq!(session.state().selected(), Some(&Fips::from("04001")));
        assert!(session.surface().hovered().is_empty());
    }

    #[test]
    fn resolves_names_and_codes() {
        let mut session = session();
        session.set_geometry(Ok(geometry())).unwrap();
        session.set_demographics(Ok(Dataset::new(vec![demographic("04001", "Apache", 1)]))).unwrap();

        assert_eq!(session.resolve_county("04001"), Some(Fips::from("04001")));
        assert_eq!(session.resolve_county("apache county"), Some(Fips::from("04001")));
        assert_eq!(session.resolve_county(" Apache "), Some(Fips::from("04001")));
        assert_eq!(session.resolve_county("cochise"), Some(Fips::from("04003")));
        assert_eq!(session.resolve_county("Yuma"), None);
    }
}
