use foundation::{LatLng, MapHandle, MarkerHandle};
use transition::{MapAdapter, MapError, MarkerContent};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// Maps and markers live in JS arrays; Rust only ever sees their indices.
#[wasm_bindgen(inline_js = "
const __site_maps = [];
const __site_markers = [];

export function site_map_available() {
    return typeof window.L !== 'undefined' && typeof window.L.map === 'function';
}

export function site_map_create(container, lat, lng, zoom) {
    const map = window.L.map(container, {
        center: [lat, lng],
        zoom: zoom,
        zoomControl: true,
        scrollWheelZoom: false,
        dragging: false,
    });
    window.L.tileLayer('https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png', {
        attribution: '&copy; OpenStreetMap contributors &copy; CARTO',
        subdomains: 'abcd',
        maxZoom: 19,
    }).addTo(map);
    __site_maps.push(map);
    return __site_maps.length - 1;
}

function __site_map(id) {
    const map = __site_maps[id];
    if (!map) throw new Error('no map ' + id);
    return map;
}

function __site_marker(id) {
    const marker = __site_markers[id];
    if (!marker) throw new Error('no marker ' + id);
    return marker;
}

export function site_map_add_marker(map, lat, lng, html) {
    const marker = window.L.circleMarker([lat, lng], {
        radius: 8,
        color: '#ff6b6b',
        fillColor: '#ff6b6b',
        fillOpacity: 0.8,
    }).addTo(__site_map(map));
    marker.bindTooltip(html, { direction: 'top', className: 'sourcing-tooltip' });
    __site_markers.push(marker);
    return __site_markers.length - 1;
}

export function site_map_set_view(map, lat, lng, zoom, animate) {
    __site_map(map).setView([lat, lng], zoom, { animate: animate, duration: 1.5 });
}

export function site_map_invalidate(map) {
    __site_map(map).invalidateSize();
}

export function site_map_enable(map) {
    const m = __site_map(map);
    m.dragging.enable();
    m.scrollWheelZoom.enable();
    m.doubleClickZoom.enable();
    m.touchZoom.enable();
}

export function site_map_close_tooltips(map) {
    __site_map(map).eachLayer((layer) => {
        if (layer.closeTooltip) layer.closeTooltip();
    });
    document.querySelectorAll('.sourcing-tooltip .highlighted').forEach((el) => {
        el.classList.remove('highlighted');
    });
}

export function site_map_open_tooltip(marker, highlight) {
    const m = __site_marker(marker);
    m.openTooltip();
    if (highlight === undefined || highlight === null) return;
    const el = m.getTooltip() && m.getTooltip().getElement();
    if (!el) return;
    el.querySelectorAll('[data-product]').forEach((item) => {
        item.classList.toggle('highlighted', item.dataset.product === highlight);
    });
}
")]
extern "C" {
    fn site_map_available() -> bool;

    #[wasm_bindgen(catch)]
    fn site_map_create(container: &str, lat: f64, lng: f64, zoom: u8) -> Result<u32, JsValue>;

    #[wasm_bindgen(catch)]
    fn site_map_add_marker(map: u32, lat: f64, lng: f64, html: &str) -> Result<u32, JsValue>;

    #[wasm_bindgen(catch)]
    fn site_map_set_view(
        map: u32,
        lat: f64,
        lng: f64,
        zoom: u8,
        animate: bool,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn site_map_invalidate(map: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn site_map_enable(map: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn site_map_close_tooltips(map: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn site_map_open_tooltip(marker: u32, highlight: Option<String>) -> Result<(), JsValue>;
}

fn backend(err: JsValue) -> MapError {
    let message = match err.dyn_ref::<js_sys::Error>() {
        Some(e) => String::from(e.message()),
        None => err.as_string().unwrap_or_else(|| format!("{err:?}")),
    };
    MapError::Backend(message)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Tooltip markup. Each product carries `data-product` so a highlight can be
/// applied when the tooltip opens.
pub fn tooltip_html(content: &MarkerContent) -> String {
    let products: String = content
        .products
        .iter()
        .map(|p| format!("<li data-product=\"{0}\">{0}</li>", escape(p)))
        .collect();
    format!(
        "<div class=\"tooltip-header\"><span class=\"flag\">{}</span><strong>{}</strong></div>\
         <div class=\"tooltip-supplier\">{}</div>\
         <div class=\"tooltip-shipments\">{}</div>\
         <p>{}</p><ul class=\"tooltip-products\">{}</ul>",
        escape(&content.flag),
        escape(&content.name),
        escape(&content.supplier),
        escape(&content.shipments),
        escape(&content.description),
        products,
    )
}

/// [`MapAdapter`] over the page's global Leaflet (`window.L`).
#[derive(Debug, Default)]
pub struct LeafletMap;

impl MapAdapter for LeafletMap {
    fn create(&mut self, container: &str, center: LatLng, zoom: u8) -> Result<MapHandle, MapError> {
        if !site_map_available() {
            return Err(MapError::Unavailable);
        }
        let present = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(container))
            .is_some();
        if !present {
            return Err(MapError::MissingContainer(container.to_owned()));
        }
        site_map_create(container, center.lat, center.lng, zoom)
            .map(MapHandle)
            .map_err(backend)
    }

    fn add_marker(
        &mut self,
        map: MapHandle,
        at: LatLng,
        content: &MarkerContent,
    ) -> Result<MarkerHandle, MapError> {
        site_map_add_marker(map.0, at.lat, at.lng, &tooltip_html(content))
            .map(MarkerHandle)
            .map_err(backend)
    }

    fn set_view(
        &mut self,
        map: MapHandle,
        at: LatLng,
        zoom: u8,
        animate: bool,
    ) -> Result<(), MapError> {
        site_map_set_view(map.0, at.lat, at.lng, zoom, animate).map_err(backend)
    }

    fn invalidate_size(&mut self, map: MapHandle) -> Result<(), MapError> {
        site_map_invalidate(map.0).map_err(backend)
    }

    fn enable_interactions(&mut self, map: MapHandle) -> Result<(), MapError> {
        site_map_enable(map.0).map_err(backend)
    }

    fn close_tooltips(&mut self, map: MapHandle) -> Result<(), MapError> {
        site_map_close_tooltips(map.0).map_err(backend)
    }

    fn open_tooltip(
        &mut self,
        marker: MarkerHandle,
        highlight: Option<&str>,
    ) -> Result<(), MapError> {
        site_map_open_tooltip(marker.0, highlight.map(str::to_owned)).map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::{escape, tooltip_html};
    use transition::MarkerContent;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn tooltip_tags_each_product() {
        let html = tooltip_html(&MarkerContent {
            name: "Ecuador".into(),
            flag: "EC".into(),
            supplier: "Pacific Catch".into(),
            shipments: "Weekly".into(),
            description: "Farmed shrimp".into(),
            products: vec!["White Shrimp".into(), "Tilapia".into()],
        });
        assert!(html.contains("<li data-product=\"White Shrimp\">White Shrimp</li>"));
        assert!(html.contains("<li data-product=\"Tilapia\">Tilapia</li>"));
        assert!(html.contains("<strong>Ecuador</strong>"));
    }
}
