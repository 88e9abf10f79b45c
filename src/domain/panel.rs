// Panel domain model
use super::link::DataLink;
use super::query::{DatasourceRef, Query};
use super::threshold::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStyle {
    Line,
    Bars,
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineInterpolation {
    Linear,
    Smooth,
    StepAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientMode {
    Opacity,
    Scheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendDisplayMode {
    List,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipMode {
    Single,
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigValueColorMode {
    Value,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigValueGraphMode {
    None,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPlacement {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueVisibility {
    Auto,
    Always,
    Never,
}

/// Legend at the bottom of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub show: bool,
    pub display_mode: LegendDisplayMode,
    pub calcs: Vec<String>,
}

impl Legend {
    pub fn hidden() -> Self {
        Self {
            show: false,
            display_mode: LegendDisplayMode::List,
            calcs: Vec::new(),
        }
    }

    pub fn list() -> Self {
        Self {
            show: true,
            display_mode: LegendDisplayMode::List,
            calcs: Vec::new(),
        }
    }

    pub fn table(calcs: &[&str]) -> Self {
        Self {
            show: true,
            display_mode: LegendDisplayMode::Table,
            calcs: calcs.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tooltip {
    pub mode: TooltipMode,
    pub sort: Option<SortOrder>,
}

impl Tooltip {
    pub fn multi_descending() -> Self {
        Self {
            mode: TooltipMode::Multi,
            sort: Some(SortOrder::Descending),
        }
    }

    pub fn single() -> Self {
        Self {
            mode: TooltipMode::Single,
            sort: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GaugeOptions {
    pub reduce_calcs: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatOptions {
    pub color_mode: BigValueColorMode,
    pub graph_mode: BigValueGraphMode,
    pub reduce_calcs: Option<Vec<String>>,
}

impl Default for StatOptions {
    fn default() -> Self {
        Self {
            color_mode: BigValueColorMode::Value,
            graph_mode: BigValueGraphMode::Area,
            reduce_calcs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesOptions {
    pub line_width: u32,
    pub fill_opacity: u32,
    pub draw_style: DrawStyle,
    pub line_interpolation: Option<LineInterpolation>,
    pub gradient_mode: Option<GradientMode>,
    pub span_nulls: bool,
    pub legend: Option<Legend>,
    pub tooltip: Option<Tooltip>,
}

impl Default for TimeSeriesOptions {
    fn default() -> Self {
        Self {
            line_width: 1,
            fill_opacity: 0,
            draw_style: DrawStyle::Line,
            line_interpolation: None,
            gradient_mode: None,
            span_nulls: false,
            legend: None,
            tooltip: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateTimelineOptions {
    pub merge_values: bool,
    pub row_height: f64,
    pub show_value: ValueVisibility,
    pub legend: Option<Legend>,
    pub tooltip: Option<Tooltip>,
}

/// Where a map layer takes its coordinates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateFields {
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub layer_type: String,
    pub name: String,
    pub location: Option<CoordinateFields>,
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
    pub all_layers: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeomapOptions {
    pub basemap: MapLayer,
    pub layers: Vec<MapLayer>,
    pub view: MapView,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    Gauge(GaugeOptions),
    Stat(StatOptions),
    TimeSeries(TimeSeriesOptions),
    StateTimeline(StateTimelineOptions),
    Geomap(GeomapOptions),
}

impl PanelKind {
    pub fn plugin_id(&self) -> &'static str {
        match self {
            PanelKind::Gauge(_) => "gauge",
            PanelKind::Stat(_) => "stat",
            PanelKind::TimeSeries(_) => "timeseries",
            PanelKind::StateTimeline(_) => "state-timeline",
            PanelKind::Geomap(_) => "geomap",
        }
    }

    /// Charts draw every target as its own series.
    pub fn is_chart(&self) -> bool {
        matches!(self, PanelKind::TimeSeries(_) | PanelKind::StateTimeline(_))
    }
}

/// Which fields an override applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    ByName(String),
    ByFrameRefId(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverrideProperty {
    Unit(String),
    FixedColor(String),
    ThresholdColor,
    AxisSoftMin(f64),
    AxisSoftMax(f64),
    AxisPlacement(AxisPlacement),
    DrawStyle(DrawStyle),
    FillOpacity(u32),
    LineWidth(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldOverride {
    pub matcher: Matcher,
    pub properties: Vec<OverrideProperty>,
}

impl FieldOverride {
    pub fn by_name(name: &str, properties: Vec<OverrideProperty>) -> Self {
        Self {
            matcher: Matcher::ByName(name.to_string()),
            properties,
        }
    }

    pub fn by_ref_id(ref_id: &str, properties: Vec<OverrideProperty>) -> Self {
        Self {
            matcher: Matcher::ByFrameRefId(ref_id.to_string()),
            properties,
        }
    }

    /// Pin one series to a fixed colour.
    pub fn series_color(name: &str, color: &str) -> Self {
        Self::by_name(name, vec![OverrideProperty::FixedColor(color.to_string())])
    }
}

/// Post-query data transformation, passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    pub id: String,
    pub options: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub description: Option<String>,
    pub datasource: Option<DatasourceRef>,
    pub height: u32,
    pub span: u32,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub decimals: Option<u32>,
    pub thresholds: Option<Thresholds>,
    pub targets: Vec<Query>,
    pub overrides: Vec<FieldOverride>,
    pub links: Vec<DataLink>,
    pub transformations: Vec<Transformation>,
    pub kind: PanelKind,
}

impl Panel {
    pub fn new(kind: PanelKind) -> Self {
        Self {
            title: String::new(),
            description: None,
            datasource: None,
            height: 8,
            span: 12,
            unit: None,
            min: None,
            max: None,
            decimals: None,
            thresholds: None,
            targets: Vec::new(),
            overrides: Vec::new(),
            links: Vec::new(),
            transformations: Vec::new(),
            kind,
        }
    }

    pub fn gauge() -> Self {
        Self::new(PanelKind::Gauge(GaugeOptions::default()))
    }

    pub fn stat() -> Self {
        Self::new(PanelKind::Stat(StatOptions::default()))
    }

    pub fn time_series() -> Self {
        Self::new(PanelKind::TimeSeries(TimeSeriesOptions::default()))
    }

    pub fn with_kind(mut self, kind: PanelKind) -> Self {
        self.kind = kind;
        self
    }

    /// Adjust time-series options; other kinds pass through unchanged.
    pub fn with_time_series(mut self, adjust: impl FnOnce(&mut TimeSeriesOptions)) -> Self {
        if let PanelKind::TimeSeries(options) = &mut self.kind {
            adjust(options);
        }
        self
    }

    /// refId of every target, explicit or positional.
    pub fn ref_ids(&self) -> Vec<String> {
        self.targets
            .iter()
            .enumerate()
            .map(|(index, target)| {
                target
                    .ref_id
                    .clone()
                    .unwrap_or_else(|| super::query::default_ref_id(index))
            })
            .collect()
    }

    /// Whether any override matches the target at `index`, by legend or refId.
    pub fn has_override_for(&self, index: usize) -> bool {
        let Some(target) = self.targets.get(index) else {
            return false;
        };
        let ref_id = self.ref_ids().swap_remove(index);

        self.overrides.iter().any(|o| match &o.matcher {
            Matcher::ByName(name) => target.legend.as_deref() == Some(name.as_str()),
            Matcher::ByFrameRefId(id) => *id == ref_id,
        })
    }
}
