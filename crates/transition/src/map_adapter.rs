use catalog::SourcingLocation;
use foundation::{LatLng, MapHandle, MarkerHandle};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("map library is not available")]
    Unavailable,
    #[error("map container `{0}` not found")]
    MissingContainer(String),
    #[error("map has not been created")]
    NotCreated,
    #[error("unknown map {0:?}")]
    UnknownMap(MapHandle),
    #[error("unknown marker {0:?}")]
    UnknownMarker(MarkerHandle),
    #[error("map call failed: {0}")]
    Backend(String),
}

/// What a marker's tooltip shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerContent {
    pub name: String,
    pub flag: String,
    pub supplier: String,
    pub shipments: String,
    pub description: String,
    pub products: Vec<String>,
}

impl From<&SourcingLocation> for MarkerContent {
    fn from(loc: &SourcingLocation) -> Self {
        Self {
            name: loc.name.clone(),
            flag: loc.flag.clone(),
            supplier: loc.supplier.clone(),
            shipments: loc.shipments.clone(),
            description: loc.description.clone(),
            products: loc.products.clone(),
        }
    }
}

/// The slippy-map widget as seen by the transition machine.
pub trait MapAdapter {
    fn create(&mut self, container: &str, center: LatLng, zoom: u8) -> Result<MapHandle, MapError>;

    fn add_marker(
        &mut self,
        map: MapHandle,
        at: LatLng,
        content: &MarkerContent,
    ) -> Result<MarkerHandle, MapError>;

    fn set_view(&mut self, map: MapHandle, at: LatLng, zoom: u8, animate: bool)
    -> Result<(), MapError>;

    /// Recomputes the widget layout after its container changed visibility.
    fn invalidate_size(&mut self, map: MapHandle) -> Result<(), MapError>;

    /// Re-enables pan, zoom and drag.
    fn enable_interactions(&mut self, map: MapHandle) -> Result<(), MapError>;

    /// Closes every open tooltip and clears pinned state.
    fn close_tooltips(&mut self, map: MapHandle) -> Result<(), MapError>;

    /// Opens a marker's tooltip, optionally highlighting one product in it.
    fn open_tooltip(&mut self, marker: MarkerHandle, highlight: Option<&str>)
    -> Result<(), MapError>;
}

impl<M: MapAdapter + ?Sized> MapAdapter for Box<M> {
    fn create(&mut self, container: &str, center: LatLng, zoom: u8) -> Result<MapHandle, MapError> {
        (**self).create(container, center, zoom)
    }

    fn add_marker(
        &mut self,
        map: MapHandle,
        at: LatLng,
        content: &MarkerContent,
    ) -> Result<MarkerHandle, MapError> {
        (**self).add_marker(map, at, content)
    }

    fn set_view(
        &mut self,
        map: MapHandle,
        at: LatLng,
        zoom: u8,
        animate: bool,
    ) -> Result<(), MapError> {
        (**self).set_view(map, at, zoom, animate)
    }

    fn invalidate_size(&mut self, map: MapHandle) -> Result<(), MapError> {
        (**self).invalidate_size(map)
    }

    fn enable_interactions(&mut self, map: MapHandle) -> Result<(), MapError> {
        (**self).enable_interactions(map)
    }

    fn close_tooltips(&mut self, map: MapHandle) -> Result<(), MapError> {
        (**self).close_tooltips(map)
    }

    fn open_tooltip(
        &mut self,
        marker: MarkerHandle,
        highlight: Option<&str>,
    ) -> Result<(), MapError> {
        (**self).open_tooltip(marker, highlight)
    }
}

/// One call observed by [`RecordingMap`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "kebab-case")]
pub enum MapCall {
    Create {
        container: String,
        center: LatLng,
        zoom: u8,
    },
    AddMarker {
        map: MapHandle,
        at: LatLng,
        name: String,
    },
    SetView {
        map: MapHandle,
        at: LatLng,
        zoom: u8,
        animate: bool,
    },
    InvalidateSize {
        map: MapHandle,
    },
    EnableInteractions {
        map: MapHandle,
    },
    CloseTooltips {
        map: MapHandle,
    },
    OpenTooltip {
        marker: MarkerHandle,
        highlight: Option<String>,
    },
}

/// Headless adapter that records every call. Used by the simulator and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingMap {
    calls: Vec<MapCall>,
    maps: u32,
    markers: Vec<(MarkerHandle, String)>,
    unavailable: bool,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// An adapter whose `create` always fails, as when the widget library
    /// did not load.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[MapCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<MapCall> {
        std::mem::take(&mut self.calls)
    }

    /// Name of the location a marker was created for.
    pub fn marker_name(&self, marker: MarkerHandle) -> Option<&str> {
        self.markers
            .iter()
            .find(|(m, _)| *m == marker)
            .map(|(_, name)| name.as_str())
    }

    fn check_map(&self, map: MapHandle) -> Result<(), MapError> {
        if map.0 == 0 || map.0 > self.maps {
            return Err(MapError::UnknownMap(map));
        }
        Ok(())
    }
}

impl MapAdapter for RecordingMap {
    fn create(&mut self, container: &str, center: LatLng, zoom: u8) -> Result<MapHandle, MapError> {
        if self.unavailable {
            return Err(MapError::Unavailable);
        }
        self.maps += 1;
        self.calls.push(MapCall::Create {
            container: container.to_owned(),
            center,
            zoom,
        });
        Ok(MapHandle(self.maps))
    }

    fn add_marker(
        &mut self,
        map: MapHandle,
        at: LatLng,
        content: &MarkerContent,
    ) -> Result<MarkerHandle, MapError> {
        self.check_map(map)?;
        let marker = MarkerHandle(self.markers.len() as u32 + 1);
        self.markers.push((marker, content.name.clone()));
        self.calls.push(MapCall::AddMarker {
            map,
            at,
            name: content.name.clone(),
        });
        Ok(marker)
    }

    fn set_view(
        &mut self,
        map: MapHandle,
        at: LatLng,
        zoom: u8,
        animate: bool,
    ) -> Result<(), MapError> {
        self.check_map(map)?;
        self.calls.push(MapCall::SetView {
            map,
            at,
            zoom,
            animate,
        });
        Ok(())
    }

    fn invalidate_size(&mut self, map: MapHandle) -> Result<(), MapError> {
        self.check_map(map)?;
        self.calls.push(MapCall::InvalidateSize { map });
        Ok(())
    }

    fn enable_interactions(&mut self, map: MapHandle) -> Result<(), MapError> {
        self.check_map(map)?;
        self.calls.push(MapCall::EnableInteractions { map });
        Ok(())
    }

    fn close_tooltips(&mut self, map: MapHandle) -> Result<(), MapError> {
        self.check_map(map)?;
        self.calls.push(MapCall::CloseTooltips { map });
        Ok(())
    }

    fn open_tooltip(
        &mut self,
        marker: MarkerHandle,
        highlight: Option<&str>,
    ) -> Result<(), MapError> {
        if self.marker_name(marker).is_none() {
            return Err(MapError::UnknownMarker(marker));
        }
        self.calls.push(MapCall::OpenTooltip {
            marker,
            highlight: highlight.map(str::to_owned),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MapAdapter, MapCall, MapError, MarkerContent, RecordingMap};
    use foundation::{LatLng, MapHandle, MarkerHandle};

    fn content(name: &str) -> MarkerContent {
        MarkerContent {
            name: name.into(),
            flag: String::new(),
            supplier: String::new(),
            shipments: String::new(),
            description: String::new(),
            products: Vec::new(),
        }
    }

    #[test]
    fn records_calls_in_order() {
        let mut map = RecordingMap::new();
        let h = map.create("final-map", LatLng::new(20.0, 0.0), 2).unwrap();
        let m = map
            .add_marker(h, LatLng::new(10.0, 10.0), &content("Panama"))
            .unwrap();
        map.open_tooltip(m, Some("Tilapia")).unwrap();
        assert_eq!(map.calls().len(), 3);
        assert_eq!(map.marker_name(m), Some("Panama"));
        assert!(matches!(
            &map.calls()[2],
            MapCall::OpenTooltip { highlight: Some(h), .. } if h == "Tilapia"
        ));
    }

    #[test]
    fn rejects_unknown_handles() {
        let mut map = RecordingMap::new();
        assert_eq!(
            map.invalidate_size(MapHandle(3)),
            Err(MapError::UnknownMap(MapHandle(3)))
        );
        assert_eq!(
            map.open_tooltip(MarkerHandle(1), None),
            Err(MapError::UnknownMarker(MarkerHandle(1)))
        );
        assert!(map.calls().is_empty());
    }

    #[test]
    fn unavailable_adapter_fails_create() {
        let mut map = RecordingMap::unavailable();
        assert_eq!(
            map.create("final-map", LatLng::new(0.0, 0.0), 2),
            Err(MapError::Unavailable)
        );
    }
}
