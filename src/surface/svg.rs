use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, CoordsIter, LineString, MultiPolygon, Rect};

use crate::{data::CountyCollection, scale::ColorMapping, types::Fips};

use super::{LayerKind, LayerSpec, MapSurface, PointerKind};

/// Projection function: lon/lat -> SVG coords (x,y)
type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Static renderer behind the surface interface: keeps the sources, layers,
/// paint mappings and hover flags it is sent, and draws them as an SVG document.
#[derive(Debug)]
pub struct SvgSurface {
    width: f64,
    margin: f64,
    sources: BTreeMap<String, CountyCollection>,
    layers: Vec<LayerSpec>,
    paint: BTreeMap<String, ColorMapping>,
    hovered: BTreeSet<(String, Fips)>,
    subscriptions: Vec<(String, PointerKind)>,
}

impl Default for SvgSurface {
    fn default() -> Self { Self::new(1200, 10) }
}

impl SvgSurface {
    pub fn new(width: u32, margin: u32) -> Self {
        Self {
            width: width as f64,
            margin: margin as f64,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            paint: BTreeMap::new(),
            hovered: BTreeSet::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Pointer subscriptions received so far. A static document cannot emit events.
    pub fn subscriptions(&self) -> &[(String, PointerKind)] { &self.subscriptions }

    fn bounds(&self) -> Option<Rect<f64>> {
        self.layers.iter()
            .filter_map(|layer| self.sources.get(&layer.source))
            .filter_map(CountyCollection::bounds)
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }

    /// Render every layer, in the order added.
    pub fn write_svg(&self, writer: &mut impl Write) -> Result<()> {
        let bounds = self.bounds()
            .ok_or_else(|| anyhow!("[svg] no layer has geometry; nothing to draw"))?;

        let margin = self.margin;
        let width = self.width;
        let scale = (width - 2.0 * margin) / bounds.width().max(f64::EPSILON);
        let height = bounds.height() * scale + 2.0 * margin;

        // --- Map lon/lat -> SVG coords (preserve aspect, Y down) ---
        let project = move |coord: &Coord<f64>| -> (f64, f64) {
            let x = margin + (coord.x - bounds.min().x) * scale;
            let y = margin + (bounds.max().y - coord.y) * scale; // invert vertically
            (x, y)
        };

        write_header(writer, width, height, margin, scale, &bounds)?;
        for layer in &self.layers {
            let Some(source) = self.sources.get(&layer.source) else { continue };
            match &layer.kind {
                LayerKind::Fill { color, opacity, hover_opacity } => {
                    writeln!(writer, r#"<g id="{}" class="fill">"#, escape(&layer.id))?;
                    let mapping = self.paint.get(&layer.id);
                    for feature in source.features() {
                        let fill = match (mapping, &feature.fips) {
                            (Some(mapping), Some(fips)) => mapping.get(fips.as_str()),
                            (Some(mapping), None) => mapping.fallback(),
                            (None, _) => *color,
                        };
                        let hovered = feature.fips.as_ref()
                            .is_some_and(|fips| self.hovered.contains(&(layer.source.clone(), fips.clone())));
                        let fips = escape(feature.fips.as_ref().map(Fips::as_str).unwrap_or_default());
                        writeln!(
                            writer,
                            r#"<path data-fips="{fips}" d="{}" fill="{fill}" fill-opacity="{}" fill-rule="evenodd"><title>{}</title></path>"#,
                            multipolygon_to_path(&feature.shape, &project),
                            if hovered { hover_opacity } else { opacity },
                            escape(&feature.name),
                        )?;
                    }
                    writeln!(writer, "</g>")?;
                }
                LayerKind::Line { color, width } => {
                    writeln!(
                        writer,
                        r#"<g id="{}" class="line" fill="none" stroke="{color}" stroke-width="{width}" stroke-linejoin="round">"#,
                        escape(&layer.id),
                    )?;
                    for feature in source.features() {
                        writeln!(writer, r#"<path d="{}"/>"#, multipolygon_to_path(&feature.shape, &project))?;
                    }
                    writeln!(writer, "</g>")?;
                }
            }
        }
        writeln!(writer, "</svg>")?;

        Ok(())
    }

    pub fn to_svg_string(&self) -> Result<String> {
        let mut out = Vec::new();
        self.write_svg(&mut out)?;
        String::from_utf8(out).context("[svg] output is not UTF-8")
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("[svg] Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.write_svg(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl MapSurface for SvgSurface {
    fn set_source_data(&mut self, source_id: &str, data: &CountyCollection) -> Result<()> {
        self.sources.insert(source_id.to_string(), data.clone());
        Ok(())
    }

    fn has_layer(&self, layer_id: &str) -> bool { self.layers.iter().any(|l| l.id == layer_id) }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<()> {
        if self.has_layer(&layer.id) {
            bail!("[svg] layer {:?} already exists", layer.id);
        }
        if !self.sources.contains_key(&layer.source) {
            bail!("[svg] layer {:?} refers to missing source {:?}", layer.id, layer.source);
        }
        self.layers.push(layer.clone());
        Ok(())
    }

    fn set_paint_color_mapping(&mut self, layer_id: &str, _property: &str, mapping: &ColorMapping) -> Result<()> {
        if !self.has_layer(layer_id) {
            bail!("[svg] cannot paint missing layer {layer_id:?}");
        }
        self.paint.insert(layer_id.to_string(), mapping.clone());
        Ok(())
    }

    fn set_feature_hover_flag(&mut self, source_id: &str, fips: &Fips, hovered: bool) -> Result<()> {
        if !self.sources.contains_key(source_id) {
            bail!("[svg] missing source {source_id:?}");
        }
        let key = (source_id.to_string(), fips.clone());
        if hovered {
            self.hovered.insert(key);
        } else {
            self.hovered.remove(&key);
        }
        Ok(())
    }

    fn on_pointer(&mut self, layer_id: &str, kind: PointerKind) -> Result<()> {
        self.subscriptions.push((layer_id.to_string(), kind));
        Ok(())
    }
}

/// Write the SVG header, including the XML declaration and opening <svg> tag.
fn write_header(writer: &mut impl Write, width: f64, height: f64, margin: f64, scale: f64, bounds: &Rect<f64>) -> Result<()> {
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
    width="{width}" height="{height:.3}"
    viewBox="0 0 {width} {height:.3}"
    data-lon-min="{lon_min}" data-lon-max="{lon_max}"
    data-lat-min="{lat_min}" data-lat-max="{lat_max}"
    data-margin="{margin}" data-scale="{scale}">"##,
        lon_min = bounds.min().x,
        lon_max = bounds.max().x,
        lat_min = bounds.min().y,
        lat_max = bounds.max().y,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        ring_to_path(polygon.exterior(), project, &mut out);
        for interior in polygon.interiors() {
            ring_to_path(interior, project, &mut out);
        }
    }

    out
}

/// Append a ring as an SVG subpath: "M x,y L x,y ... Z"
fn ring_to_path(ring: &LineString<f64>, project: &Projection, out: &mut String) {
    let mut coords = ring.coords_iter().map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}
