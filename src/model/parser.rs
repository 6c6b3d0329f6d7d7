//! JSON document to [`Composition`].
//!
//! The document is first deserialized into loosely typed `*Def` structs, then
//! lowered into the model: animated properties are resolved into
//! [`Animatable`]s, easing curves are deduplicated, precomp assets are resolved
//! once and shared, and image assets are decoded through an [`ImageLoader`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;

use crate::foundation::core::{Color, Point, Vec2};
use crate::foundation::error::{LottieError, LottieResult};
use crate::geometry::{CapStyle, Direction, JoinStyle};
use crate::loader::ImageLoader;
use crate::model::animatable::{Animatable, Interpolator, Keyframe, Lerp, Tangents};
use crate::model::composition::{Asset, Composition, ImageAsset, ImageSource, Marker};
use crate::model::content::{
    ContentItem, Dash, EllipseShape, Fill, GradientData, GradientFill, GradientParams,
    GradientStroke, GradientType, Group, ItemInfo, PathShape, Polystar, PolystarKind, RectShape,
    Repeater, ShapeData, Stroke, StrokeParams, Trim, TrimMode,
};
use crate::model::layer::{Layer, LayerKind, Mask, MaskMode, MatteType};
use crate::model::transform::{Position, Transform};
use crate::raster::FillRule;

#[derive(Debug, Deserialize)]
struct CompositionDef {
    #[serde(default)]
    v: String,
    #[serde(default)]
    nm: Option<String>,
    fr: f32,
    ip: f32,
    op: f32,
    w: f64,
    h: f64,
    layers: Vec<LayerDef>,
    #[serde(default)]
    assets: Vec<AssetDef>,
    #[serde(default)]
    markers: Vec<MarkerDef>,
}

#[derive(Debug, Deserialize)]
struct MarkerDef {
    #[serde(default)]
    cm: String,
    #[serde(default)]
    tm: f32,
    #[serde(default)]
    dr: f32,
}

#[derive(Debug, Deserialize)]
struct AssetDef {
    id: String,
    #[serde(default)]
    layers: Option<Vec<LayerDef>>,
    #[serde(default)]
    w: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    u: Option<String>,
    #[serde(default)]
    p: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LayerDef {
    #[serde(default)]
    ty: i64,
    #[serde(default)]
    nm: Option<String>,
    #[serde(default)]
    ind: Option<i64>,
    #[serde(default)]
    parent: Option<i64>,
    #[serde(default)]
    ip: Option<f32>,
    #[serde(default)]
    op: Option<f32>,
    #[serde(default)]
    st: f32,
    #[serde(default)]
    sr: Option<f32>,
    #[serde(default)]
    tm: Option<PropDef>,
    #[serde(default)]
    ks: Option<TransformDef>,
    #[serde(default, rename = "masksProperties")]
    masks: Vec<MaskDef>,
    #[serde(default)]
    tt: Option<i64>,
    #[serde(default)]
    td: Option<i64>,
    #[serde(default)]
    hd: bool,
    #[serde(default, rename = "refId")]
    ref_id: Option<String>,
    #[serde(default)]
    w: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    sw: Option<f64>,
    #[serde(default)]
    sh: Option<f64>,
    #[serde(default)]
    sc: Option<String>,
    #[serde(default)]
    shapes: Vec<ShapeDef>,
}

#[derive(Debug, Deserialize)]
struct MaskDef {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    inv: bool,
    #[serde(default)]
    pt: Option<PropDef>,
    #[serde(default)]
    o: Option<PropDef>,
}

#[derive(Debug, Default, Deserialize)]
struct TransformDef {
    #[serde(default)]
    a: Option<PropDef>,
    #[serde(default)]
    p: Option<PropDef>,
    #[serde(default)]
    s: Option<PropDef>,
    #[serde(default)]
    r: Option<PropDef>,
    #[serde(default)]
    rz: Option<PropDef>,
    #[serde(default)]
    o: Option<PropDef>,
    #[serde(default)]
    sk: Option<PropDef>,
    #[serde(default)]
    sa: Option<PropDef>,
    #[serde(default)]
    so: Option<PropDef>,
    #[serde(default)]
    eo: Option<PropDef>,
}

/// Animated property as found in the document.
#[derive(Debug, Default, Deserialize)]
struct PropDef {
    #[serde(default)]
    k: Value,
    // Split position.
    #[serde(default)]
    s: bool,
    #[serde(default)]
    x: Option<Box<PropDef>>,
    #[serde(default)]
    y: Option<Box<PropDef>>,
}

#[derive(Debug, Deserialize)]
struct KeyframeDef {
    #[serde(default)]
    t: f32,
    #[serde(default)]
    s: Option<Value>,
    #[serde(default)]
    e: Option<Value>,
    #[serde(default)]
    i: Option<EaseDef>,
    #[serde(default)]
    o: Option<EaseDef>,
    #[serde(default)]
    h: i64,
    #[serde(default)]
    to: Option<Vec<f64>>,
    #[serde(default)]
    ti: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct EaseDef {
    x: OneOrMany,
    y: OneOrMany,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(f64),
    Many(Vec<f64>),
}

impl OneOrMany {
    fn first(&self) -> f64 {
        match self {
            Self::One(v) => *v,
            Self::Many(v) => v.first().copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct InfoDef {
    #[serde(default)]
    nm: Option<String>,
    #[serde(default)]
    hd: bool,
}

#[derive(Debug, Deserialize)]
struct GradientDef {
    #[serde(default)]
    p: usize,
    k: PropDef,
}

#[derive(Debug, Deserialize)]
struct DashDef {
    #[serde(default)]
    n: String,
    v: PropDef,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "ty")]
enum ShapeDef {
    #[serde(rename = "gr")]
    Group {
        #[serde(flatten)]
        info: InfoDef,
        #[serde(default)]
        it: Vec<ShapeDef>,
    },
    #[serde(rename = "tr")]
    Transform(TransformDef),
    #[serde(rename = "rc")]
    Rect {
        #[serde(flatten)]
        info: InfoDef,
        p: Option<PropDef>,
        s: Option<PropDef>,
        r: Option<PropDef>,
        #[serde(default)]
        d: i64,
    },
    #[serde(rename = "el")]
    Ellipse {
        #[serde(flatten)]
        info: InfoDef,
        p: Option<PropDef>,
        s: Option<PropDef>,
        #[serde(default)]
        d: i64,
    },
    #[serde(rename = "sh")]
    Path {
        #[serde(flatten)]
        info: InfoDef,
        ks: Option<PropDef>,
        #[serde(default)]
        d: i64,
    },
    #[serde(rename = "sr")]
    Polystar {
        #[serde(flatten)]
        info: InfoDef,
        #[serde(default)]
        sy: i64,
        p: Option<PropDef>,
        pt: Option<PropDef>,
        ir: Option<PropDef>,
        is: Option<PropDef>,
        or: Option<PropDef>,
        os: Option<PropDef>,
        r: Option<PropDef>,
        #[serde(default)]
        d: i64,
    },
    #[serde(rename = "fl")]
    Fill {
        #[serde(flatten)]
        info: InfoDef,
        c: Option<PropDef>,
        o: Option<PropDef>,
        #[serde(default)]
        r: i64,
    },
    #[serde(rename = "st")]
    Stroke {
        #[serde(flatten)]
        info: InfoDef,
        c: Option<PropDef>,
        o: Option<PropDef>,
        #[serde(flatten)]
        stroke: StrokeDef,
    },
    #[serde(rename = "gf")]
    GradientFill {
        #[serde(flatten)]
        info: InfoDef,
        #[serde(flatten)]
        gradient: GradientParamsDef,
        #[serde(default)]
        r: i64,
    },
    #[serde(rename = "gs")]
    GradientStroke {
        #[serde(flatten)]
        info: InfoDef,
        #[serde(flatten)]
        gradient: GradientParamsDef,
        #[serde(flatten)]
        stroke: StrokeDef,
    },
    #[serde(rename = "tm")]
    Trim {
        #[serde(flatten)]
        info: InfoDef,
        s: Option<PropDef>,
        e: Option<PropDef>,
        o: Option<PropDef>,
        #[serde(default)]
        m: i64,
    },
    #[serde(rename = "rp")]
    Repeater {
        #[serde(flatten)]
        info: InfoDef,
        c: Option<PropDef>,
        o: Option<PropDef>,
        #[serde(default)]
        tr: TransformDef,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct StrokeDef {
    w: Option<PropDef>,
    #[serde(default)]
    lc: i64,
    #[serde(default)]
    lj: i64,
    #[serde(default)]
    ml: Option<f32>,
    #[serde(default)]
    d: Vec<DashDef>,
}

#[derive(Debug, Deserialize)]
struct GradientParamsDef {
    #[serde(default)]
    t: i64,
    s: Option<PropDef>,
    e: Option<PropDef>,
    h: Option<PropDef>,
    a: Option<PropDef>,
    g: Option<GradientDef>,
    o: Option<PropDef>,
}

/// Value kinds that can be read from a property's JSON.
trait PropValue: Lerp + Clone {
    fn from_json(v: &Value) -> Option<Self>;
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::Array(a) => a.first().and_then(number),
        _ => None,
    }
}

fn pair(v: &Value) -> Option<(f64, f64)> {
    match v {
        Value::Number(n) => n.as_f64().map(|x| (x, x)),
        Value::Array(a) => {
            let x = a.first()?.as_f64()?;
            let y = a.get(1).and_then(Value::as_f64).unwrap_or(x);
            Some((x, y))
        }
        _ => None,
    }
}

impl PropValue for f32 {
    fn from_json(v: &Value) -> Option<Self> {
        number(v).map(|x| x as f32)
    }
}

impl PropValue for Vec2 {
    fn from_json(v: &Value) -> Option<Self> {
        pair(v).map(|(x, y)| Vec2::new(x, y))
    }
}

impl PropValue for Point {
    fn from_json(v: &Value) -> Option<Self> {
        pair(v).map(|(x, y)| Point::new(x, y))
    }
}

impl PropValue for Color {
    fn from_json(v: &Value) -> Option<Self> {
        let a = v.as_array()?;
        let c = |i: usize, default: f64| a.get(i).and_then(Value::as_f64).unwrap_or(default) as f32;
        Some(Color {
            r: c(0, 0.0),
            g: c(1, 0.0),
            b: c(2, 0.0),
            a: c(3, 1.0),
        })
    }
}

impl PropValue for ShapeData {
    fn from_json(v: &Value) -> Option<Self> {
        let obj = match v {
            Value::Array(a) => a.first()?,
            other => other,
        };
        let points = |key: &str| -> Vec<Point> {
            obj.get(key)
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(pair)
                        .map(|(x, y)| Point::new(x, y))
                        .collect()
                })
                .unwrap_or_default()
        };
        let vertices = points("v");
        let in_tangents: Vec<Vec2> = points("i").into_iter().map(Point::to_vec2).collect();
        let out_tangents: Vec<Vec2> = points("o").into_iter().map(Point::to_vec2).collect();
        let closed = obj.get("c").and_then(Value::as_bool).unwrap_or(false);
        Some(ShapeData::from_vertices(&vertices, &in_tangents, &out_tangents, closed))
    }
}

impl PropValue for GradientData {
    fn from_json(v: &Value) -> Option<Self> {
        let a = v.as_array()?;
        Some(GradientData(a.iter().filter_map(|x| x.as_f64().map(|x| x as f32)).collect()))
    }
}

/// Lowers `*Def` trees into model types.
struct Lowering<'a> {
    frame: (f32, f32),
    assets: HashMap<&'a str, &'a AssetDef>,
    precomps: HashMap<String, Arc<Vec<Layer>>>,
    images: HashMap<String, Arc<ImageAsset>>,
    visiting: Vec<String>,
    interpolators: HashMap<[u64; 4], Arc<Interpolator>>,
    resource_dir: Option<&'a Path>,
    image_loader: &'a dyn ImageLoader,
}

/// Parse a JSON document.
///
/// `resource_dir` resolves file image assets; `image_loader` decodes them.
#[tracing::instrument(skip(json, image_loader), fields(len = json.len()))]
pub(crate) fn parse(
    json: &str,
    resource_dir: Option<&Path>,
    image_loader: &dyn ImageLoader,
) -> LottieResult<Composition> {
    let def: CompositionDef = serde_json::from_str(json)?;
    validate(&def)?;

    let mut lower = Lowering {
        frame: (def.ip, def.op),
        assets: def.assets.iter().map(|a| (a.id.as_str(), a)).collect(),
        precomps: HashMap::new(),
        images: HashMap::new(),
        visiting: Vec::new(),
        interpolators: HashMap::new(),
        resource_dir,
        image_loader,
    };

    let layers = lower.layers(&def.layers)?;
    let mut assets = HashMap::with_capacity(def.assets.len());
    for a in &def.assets {
        let asset = if a.layers.is_some() {
            Asset::Precomp(lower.precomp(&a.id)?)
        } else {
            Asset::Image(lower.image(&a.id)?)
        };
        assets.insert(a.id.clone(), asset);
    }

    let markers = def
        .markers
        .iter()
        .map(|m| Marker {
            name: m.cm.clone(),
            start_frame: m.tm,
            end_frame: m.tm + m.dr,
        })
        .collect();

    Ok(Composition {
        version: def.v.clone(),
        name: def.nm.clone(),
        frame_rate: def.fr,
        start_frame: def.ip,
        end_frame: def.op,
        width: def.w.round() as u32,
        height: def.h.round() as u32,
        layers,
        assets,
        markers,
        interpolators: lower.interpolators.into_values().collect(),
    })
}

fn validate(def: &CompositionDef) -> LottieResult<()> {
    if !def.fr.is_finite() || def.fr <= 0.0 {
        return Err(LottieError::parse(format!("frame rate must be > 0, got {}", def.fr)));
    }
    if !(def.ip.is_finite() && def.op.is_finite()) {
        return Err(LottieError::parse("start and end frame must be finite"));
    }
    if def.w.is_nan() || def.h.is_nan() || def.w.round() < 1.0 || def.h.round() < 1.0 {
        return Err(LottieError::parse(format!(
            "composition size must be > 0, got {}x{}",
            def.w, def.h
        )));
    }
    Ok(())
}

fn info(def: &InfoDef) -> ItemInfo {
    ItemInfo {
        name: def.nm.clone(),
        hidden: def.hd,
    }
}

fn direction(d: i64) -> Direction {
    if d == 3 { Direction::Ccw } else { Direction::Cw }
}

fn fill_rule(r: i64) -> FillRule {
    if r == 2 {
        FillRule::EvenOdd
    } else {
        FillRule::NonZero
    }
}

fn hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 {
        return None;
    }
    let v = u32::from_str_radix(hex, 16).ok()?;
    let c = |shift: u32| ((v >> shift) & 0xff) as f32 / 255.0;
    Some(Color::rgb(c(16), c(8), c(0)))
}

impl<'a> Lowering<'a> {
    fn layers(&mut self, defs: &[LayerDef]) -> LottieResult<Vec<Layer>> {
        defs.iter().map(|d| self.layer(d)).collect()
    }

    fn layer(&mut self, d: &LayerDef) -> LottieResult<Layer> {
        let kind = match d.ty {
            0 => {
                let ref_id = d
                    .ref_id
                    .clone()
                    .ok_or_else(|| LottieError::parse("precomp layer without refId"))?;
                let layers = self.precomp(&ref_id)?;
                LayerKind::Precomp {
                    ref_id,
                    layers,
                    width: d.w.unwrap_or(0.0) as f32,
                    height: d.h.unwrap_or(0.0) as f32,
                }
            }
            1 => LayerKind::Solid {
                width: d.sw.unwrap_or(0.0) as f32,
                height: d.sh.unwrap_or(0.0) as f32,
                color: d.sc.as_deref().and_then(hex_color).unwrap_or(Color::rgb(0.0, 0.0, 0.0)),
            },
            2 => {
                let asset = match d.ref_id.as_deref() {
                    Some(id) if self.assets.contains_key(id) => Some(self.image(id)?),
                    _ => {
                        tracing::warn!(layer = ?d.nm, "image layer references a missing asset");
                        None
                    }
                };
                LayerKind::Image { asset }
            }
            3 => LayerKind::Null,
            4 => LayerKind::Shape {
                items: self.items(&d.shapes)?.0,
            },
            5 => LayerKind::Text,
            other => {
                tracing::warn!(ty = other, layer = ?d.nm, "unsupported layer type, treated as null");
                LayerKind::Null
            }
        };

        let masks = d
            .masks
            .iter()
            .map(|m| self.mask(m))
            .collect::<LottieResult<Vec<_>>>()?;

        let transform = match &d.ks {
            Some(ks) => self.transform(ks)?,
            None => Transform::default(),
        };

        Ok(Layer {
            name: d.nm.clone(),
            index: d.ind,
            parent: d.parent,
            in_frame: d.ip.unwrap_or(self.frame.0),
            out_frame: d.op.unwrap_or(self.frame.1),
            start_time: d.st,
            time_stretch: d.sr.filter(|s| *s > 0.0).unwrap_or(1.0),
            time_remap: d.tm.as_ref().map(|tm| self.prop(tm)).transpose()?,
            transform,
            masks,
            matte: match d.tt {
                Some(1) => MatteType::Alpha,
                Some(2) => MatteType::AlphaInverted,
                Some(3) => MatteType::Luma,
                Some(4) => MatteType::LumaInverted,
                _ => MatteType::None,
            },
            is_matte_source: d.td.is_some_and(|td| td != 0),
            hidden: d.hd,
            kind,
        })
    }

    fn precomp(&mut self, id: &str) -> LottieResult<Arc<Vec<Layer>>> {
        if let Some(layers) = self.precomps.get(id) {
            return Ok(Arc::clone(layers));
        }
        if self.visiting.iter().any(|v| v == id) {
            return Err(LottieError::parse(format!("precomp reference cycle through asset '{id}'")));
        }
        let asset = self
            .assets
            .get(id)
            .copied()
            .ok_or_else(|| LottieError::parse(format!("unknown precomp asset '{id}'")))?;
        let defs = asset
            .layers
            .as_ref()
            .ok_or_else(|| LottieError::parse(format!("asset '{id}' is not a precomp")))?;

        self.visiting.push(id.to_owned());
        let layers = self.layers(defs);
        self.visiting.pop();

        let layers = Arc::new(layers?);
        self.precomps.insert(id.to_owned(), Arc::clone(&layers));
        Ok(layers)
    }

    fn image(&mut self, id: &str) -> LottieResult<Arc<ImageAsset>> {
        if let Some(image) = self.images.get(id) {
            return Ok(Arc::clone(image));
        }
        let def = self
            .assets
            .get(id)
            .copied()
            .ok_or_else(|| LottieError::parse(format!("unknown image asset '{id}'")))?;

        let name = def.p.clone().unwrap_or_default();
        let source = match name.strip_prefix("data:") {
            Some(uri) => {
                let payload = uri.split_once(',').map_or("", |(_, data)| data);
                match base64::engine::general_purpose::STANDARD.decode(payload) {
                    Ok(bytes) => ImageSource::Embedded(bytes),
                    Err(err) => {
                        tracing::warn!(asset = id, %err, "embedded image is not valid base64");
                        ImageSource::Embedded(Vec::new())
                    }
                }
            }
            None => {
                let rel = Path::new(def.u.as_deref().unwrap_or("")).join(&name);
                ImageSource::File(match self.resource_dir {
                    Some(dir) => dir.join(rel),
                    None => rel,
                })
            }
        };

        let bytes = match &source {
            ImageSource::Embedded(bytes) => Ok(bytes.clone()),
            ImageSource::File(path) => std::fs::read(path).map_err(LottieError::from),
        };
        let bitmap = match bytes.and_then(|b| self.image_loader.load(&b)) {
            Ok(bitmap) => Some(Arc::new(bitmap)),
            Err(err) => {
                tracing::warn!(asset = id, %err, "image asset could not be decoded");
                None
            }
        };

        let image = Arc::new(ImageAsset {
            id: id.to_owned(),
            width: def.w.unwrap_or(0.0).max(0.0) as u32,
            height: def.h.unwrap_or(0.0).max(0.0) as u32,
            source,
            bitmap,
        });
        self.images.insert(id.to_owned(), Arc::clone(&image));
        Ok(image)
    }

    fn mask(&mut self, m: &MaskDef) -> LottieResult<Mask> {
        let mode = match m.mode.as_deref() {
            Some("a") | None => MaskMode::Add,
            Some("s") => MaskMode::Subtract,
            Some("i") => MaskMode::Intersect,
            Some("f") => MaskMode::Difference,
            _ => MaskMode::None,
        };
        Ok(Mask {
            mode,
            inverted: m.inv,
            opacity: self.prop_or(m.o.as_ref(), 100.0)?,
            shape: self.prop_or(m.pt.as_ref(), ShapeData::default())?,
        })
    }

    fn transform(&mut self, t: &TransformDef) -> LottieResult<Transform> {
        let rotation = t.r.as_ref().or(t.rz.as_ref());
        Ok(Transform {
            anchor: self.prop_or(t.a.as_ref(), Point::ORIGIN)?,
            position: self.position(t.p.as_ref())?,
            scale: self.prop_or(t.s.as_ref(), Vec2::new(100.0, 100.0))?,
            rotation: self.prop_or(rotation, 0.0)?,
            opacity: self.prop_or(t.o.as_ref(), 100.0)?,
            skew: self.prop_or(t.sk.as_ref(), 0.0)?,
            skew_axis: self.prop_or(t.sa.as_ref(), 0.0)?,
        })
    }

    fn position(&mut self, p: Option<&PropDef>) -> LottieResult<Position> {
        match p {
            Some(p) if p.s => Ok(Position::Split {
                x: self.prop_or(p.x.as_deref(), 0.0)?,
                y: self.prop_or(p.y.as_deref(), 0.0)?,
            }),
            Some(p) => Ok(Position::Combined(self.prop(p)?)),
            None => Ok(Position::default()),
        }
    }

    /// Lower a content list, returning the items and the group transform if any.
    fn items(&mut self, defs: &[ShapeDef]) -> LottieResult<(Vec<ContentItem>, Option<Transform>)> {
        let mut items = Vec::with_capacity(defs.len());
        let mut transform = None;
        for def in defs {
            match def {
                ShapeDef::Transform(t) => transform = Some(self.transform(t)?),
                ShapeDef::Unknown => tracing::warn!("unsupported content item skipped"),
                other => items.push(self.item(other)?),
            }
        }
        Ok((items, transform))
    }

    fn item(&mut self, def: &ShapeDef) -> LottieResult<ContentItem> {
        Ok(match def {
            ShapeDef::Group { info: i, it } => {
                let (items, transform) = self.items(it)?;
                ContentItem::Group(Group {
                    info: info(i),
                    items,
                    transform,
                })
            }
            ShapeDef::Rect { info: i, p, s, r, d } => ContentItem::Rect(RectShape {
                info: info(i),
                position: self.prop_or(p.as_ref(), Point::ORIGIN)?,
                size: self.prop_or(s.as_ref(), Vec2::ZERO)?,
                roundness: self.prop_or(r.as_ref(), 0.0)?,
                direction: direction(*d),
            }),
            ShapeDef::Ellipse { info: i, p, s, d } => ContentItem::Ellipse(EllipseShape {
                info: info(i),
                position: self.prop_or(p.as_ref(), Point::ORIGIN)?,
                size: self.prop_or(s.as_ref(), Vec2::ZERO)?,
                direction: direction(*d),
            }),
            ShapeDef::Path { info: i, ks, d } => ContentItem::Path(PathShape {
                info: info(i),
                shape: self.prop_or(ks.as_ref(), ShapeData::default())?,
                direction: direction(*d),
            }),
            ShapeDef::Polystar {
                info: i,
                sy,
                p,
                pt,
                ir,
                is,
                or,
                os,
                r,
                d,
            } => ContentItem::Polystar(Polystar {
                info: info(i),
                kind: if *sy == 2 {
                    PolystarKind::Polygon
                } else {
                    PolystarKind::Star
                },
                position: self.prop_or(p.as_ref(), Point::ORIGIN)?,
                points: self.prop_or(pt.as_ref(), 5.0)?,
                inner_radius: self.prop_or(ir.as_ref(), 0.0)?,
                inner_roundness: self.prop_or(is.as_ref(), 0.0)?,
                outer_radius: self.prop_or(or.as_ref(), 0.0)?,
                outer_roundness: self.prop_or(os.as_ref(), 0.0)?,
                rotation: self.prop_or(r.as_ref(), 0.0)?,
                direction: direction(*d),
            }),
            ShapeDef::Fill { info: i, c, o, r } => ContentItem::Fill(Fill {
                info: info(i),
                color: self.prop_or(c.as_ref(), Color::WHITE)?,
                opacity: self.prop_or(o.as_ref(), 100.0)?,
                fill_rule: fill_rule(*r),
            }),
            ShapeDef::Stroke { info: i, c, o, stroke } => ContentItem::Stroke(Stroke {
                info: info(i),
                color: self.prop_or(c.as_ref(), Color::WHITE)?,
                opacity: self.prop_or(o.as_ref(), 100.0)?,
                params: self.stroke(stroke)?,
            }),
            ShapeDef::GradientFill { info: i, gradient, r } => ContentItem::GradientFill(GradientFill {
                info: info(i),
                gradient: self.gradient(gradient)?,
                fill_rule: fill_rule(*r),
            }),
            ShapeDef::GradientStroke {
                info: i,
                gradient,
                stroke,
            } => ContentItem::GradientStroke(GradientStroke {
                info: info(i),
                gradient: self.gradient(gradient)?,
                params: self.stroke(stroke)?,
            }),
            ShapeDef::Trim { info: i, s, e, o, m } => ContentItem::Trim(Trim {
                info: info(i),
                start: self.prop_or(s.as_ref(), 0.0)?,
                end: self.prop_or(e.as_ref(), 100.0)?,
                offset: self.prop_or(o.as_ref(), 0.0)?,
                mode: if *m == 2 {
                    TrimMode::Individually
                } else {
                    TrimMode::Simultaneously
                },
            }),
            ShapeDef::Repeater { info: i, c, o, tr } => ContentItem::Repeater(Repeater {
                info: info(i),
                copies: self.prop_or(c.as_ref(), 1.0)?,
                offset: self.prop_or(o.as_ref(), 0.0)?,
                transform: self.transform(tr)?,
                start_opacity: self.prop_or(tr.so.as_ref(), 100.0)?,
                end_opacity: self.prop_or(tr.eo.as_ref(), 100.0)?,
            }),
            ShapeDef::Transform(_) | ShapeDef::Unknown => {
                return Err(LottieError::parse("transform item outside a content list"));
            }
        })
    }

    fn stroke(&mut self, s: &StrokeDef) -> LottieResult<StrokeParams> {
        let mut dash = Dash::default();
        for entry in &s.d {
            let value = self.prop(&entry.v)?;
            if entry.n == "o" {
                dash.offset = value;
            } else {
                dash.pattern.push(value);
            }
        }
        Ok(StrokeParams {
            width: self.prop_or(s.w.as_ref(), 1.0)?,
            cap: match s.lc {
                2 => CapStyle::Round,
                3 => CapStyle::Square,
                _ => CapStyle::Flat,
            },
            join: match s.lj {
                2 => JoinStyle::Round,
                3 => JoinStyle::Bevel,
                _ => JoinStyle::Miter,
            },
            miter_limit: s.ml.unwrap_or(4.0),
            dash,
        })
    }

    fn gradient(&mut self, g: &GradientParamsDef) -> LottieResult<GradientParams> {
        let (color_count, stops) = match &g.g {
            Some(def) => (def.p, self.prop(&def.k)?),
            None => (0, Animatable::default()),
        };
        Ok(GradientParams {
            kind: if g.t == 2 {
                GradientType::Radial
            } else {
                GradientType::Linear
            },
            start: self.prop_or(g.s.as_ref(), Point::ORIGIN)?,
            end: self.prop_or(g.e.as_ref(), Point::ORIGIN)?,
            highlight_length: self.prop_or(g.h.as_ref(), 0.0)?,
            highlight_angle: self.prop_or(g.a.as_ref(), 0.0)?,
            color_count,
            stops,
            opacity: self.prop_or(g.o.as_ref(), 100.0)?,
        })
    }

    fn prop_or<T: PropValue>(&mut self, def: Option<&PropDef>, default: T) -> LottieResult<Animatable<T>> {
        match def {
            Some(def) => self.prop(def),
            None => Ok(Animatable::Constant(default)),
        }
    }

    fn prop<T: PropValue>(&mut self, def: &PropDef) -> LottieResult<Animatable<T>> {
        let is_keyframed = def
            .k
            .as_array()
            .and_then(|a| a.first())
            .is_some_and(|first| first.get("t").is_some());
        if !is_keyframed {
            return T::from_json(&def.k)
                .map(Animatable::Constant)
                .ok_or_else(|| LottieError::parse(format!("invalid property value: {}", def.k)));
        }

        let defs: Vec<KeyframeDef> = serde_json::from_value(def.k.clone())?;
        let value = |v: Option<&Value>| v.and_then(T::from_json);

        let Some(first) = value(defs[0].s.as_ref()) else {
            return Err(LottieError::parse("first keyframe has no start value"));
        };
        if defs.len() == 1 {
            return Ok(Animatable::Constant(first));
        }

        let mut keys = Vec::with_capacity(defs.len() - 1);
        let mut prev_end = first;
        for w in defs.windows(2) {
            let (cur, next) = (&w[0], &w[1]);
            let start = value(cur.s.as_ref()).unwrap_or_else(|| prev_end.clone());
            let end = value(cur.e.as_ref())
                .or_else(|| value(next.s.as_ref()))
                .unwrap_or_else(|| start.clone());
            let interpolator = if cur.h == 1 {
                None
            } else {
                Some(self.interpolator(cur.o.as_ref(), cur.i.as_ref()))
            };
            let tangents = match (&cur.to, &cur.ti) {
                (Some(to), Some(ti)) => Some(Tangents {
                    out: Vec2::new(to.first().copied().unwrap_or(0.0), to.get(1).copied().unwrap_or(0.0)),
                    inn: Vec2::new(ti.first().copied().unwrap_or(0.0), ti.get(1).copied().unwrap_or(0.0)),
                }),
                _ => None,
            };
            prev_end = end.clone();
            keys.push(Keyframe {
                start_frame: cur.t,
                end_frame: next.t,
                start,
                end,
                interpolator,
                tangents,
            });
        }
        Ok(Animatable::Keyframed(keys))
    }

    fn interpolator(&mut self, out: Option<&EaseDef>, inn: Option<&EaseDef>) -> Arc<Interpolator> {
        let point = |e: Option<&EaseDef>, default: f64| match e {
            Some(e) => Point::new(e.x.first(), e.y.first()),
            None => Point::new(default, default),
        };
        let interp = Interpolator::new(point(out, 0.0), point(inn, 1.0));
        Arc::clone(
            self.interpolators
                .entry(interp.key())
                .or_insert_with(|| Arc::new(interp)),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/parser.rs"]
mod tests;
