// Mapper to convert domain models to Grafana dashboard JSON
use crate::domain::dashboard::{Dashboard, DashboardItem, Variable, VariableHide, VariableKind};
use crate::domain::layout::{GridCursor, GridPos};
use crate::domain::link::DataLink;
use crate::domain::panel::{
    AxisPlacement, BigValueColorMode, BigValueGraphMode, DrawStyle, FieldOverride, GeomapOptions, GradientMode, Legend,
    LegendDisplayMode, LineInterpolation, MapLayer, Matcher, OverrideProperty, Panel, PanelKind, SortOrder, Tooltip,
    TooltipMode, ValueVisibility,
};
use crate::domain::query::{DatasourceRef, Query, QueryFormat, default_ref_id};
use crate::domain::threshold::{Thresholds, ThresholdsMode};
use serde_json::{Map, Value, json};

/// Dashboard JSON model version the generated documents follow.
pub const SCHEMA_VERSION: u32 = 39;

pub fn dashboard_to_json(dashboard: &Dashboard) -> Value {
    let mut cursor = GridCursor::new();
    let panels: Vec<Value> = dashboard
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let id = index as u32 + 1;
            match item {
                DashboardItem::Row(title) => row_to_json(title, id, cursor.place_row()),
                DashboardItem::Panel(panel) => {
                    let pos = cursor.place_panel(panel.span, panel.height);
                    panel_to_json(panel, id, pos)
                }
            }
        })
        .collect();

    let mut out = Map::new();
    out.insert("uid".into(), json!(dashboard.uid));
    out.insert("title".into(), json!(dashboard.title));
    if let Some(description) = &dashboard.description {
        out.insert("description".into(), json!(description));
    }
    out.insert("tags".into(), json!(dashboard.tags));
    out.insert("editable".into(), json!(dashboard.editable));
    out.insert("timezone".into(), json!(dashboard.timezone));
    out.insert("refresh".into(), json!(dashboard.refresh));
    out.insert(
        "time".into(),
        json!({ "from": dashboard.time.from, "to": dashboard.time.to }),
    );
    out.insert("schemaVersion".into(), json!(SCHEMA_VERSION));
    out.insert(
        "templating".into(),
        json!({ "list": dashboard.variables.iter().map(variable_to_json).collect::<Vec<_>>() }),
    );
    out.insert(
        "links".into(),
        Value::Array(dashboard.links.iter().map(link_to_json).collect()),
    );
    out.insert("panels".into(), Value::Array(panels));
    Value::Object(out)
}

/// Whole numbers become JSON integers, everything else stays a float.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

fn grid_pos_to_json(pos: GridPos) -> Value {
    json!({ "h": pos.h, "w": pos.w, "x": pos.x, "y": pos.y })
}

fn row_to_json(title: &str, id: u32, pos: GridPos) -> Value {
    json!({
        "type": "row",
        "title": title,
        "id": id,
        "collapsed": false,
        "gridPos": grid_pos_to_json(pos),
        "panels": [],
    })
}

fn variable_to_json(variable: &Variable) -> Value {
    let hide = match variable.hide {
        VariableHide::Shown => 0,
        VariableHide::Hidden => 2,
    };
    match &variable.kind {
        VariableKind::Datasource { plugin } => json!({
            "type": "datasource",
            "name": variable.name,
            "label": variable.label,
            "hide": hide,
            "query": plugin,
            "refresh": 1,
        }),
        VariableKind::TextBox { default } => json!({
            "type": "textbox",
            "name": variable.name,
            "label": variable.label,
            "hide": hide,
            "query": default,
            "current": { "text": default, "value": default },
        }),
    }
}

fn link_to_json(link: &DataLink) -> Value {
    let mut out = Map::new();
    out.insert("title".into(), json!(link.title));
    out.insert("type".into(), json!("link"));
    out.insert("url".into(), json!(link.url));
    out.insert("keepTime".into(), json!(link.keep_time));
    out.insert("includeVars".into(), json!(link.include_vars));
    out.insert("asDropdown".into(), json!(false));
    out.insert("targetBlank".into(), json!(false));
    out.insert("tags".into(), json!([]));
    out.insert("tooltip".into(), json!(""));
    if let Some(icon) = &link.icon {
        out.insert("icon".into(), json!(icon));
    }
    Value::Object(out)
}

fn datasource_to_json(datasource: &DatasourceRef) -> Value {
    json!({ "type": datasource.kind, "uid": datasource.uid })
}

fn target_to_json(query: &Query, index: usize) -> Value {
    let mut out = Map::new();
    out.insert("datasource".into(), datasource_to_json(&query.datasource));
    out.insert("expr".into(), json!(query.expr));
    out.insert(
        "refId".into(),
        json!(query.ref_id.clone().unwrap_or_else(|| default_ref_id(index))),
    );
    if let Some(legend) = &query.legend {
        out.insert("legendFormat".into(), json!(legend));
    }
    if let Some(format) = query.format {
        let format = match format {
            QueryFormat::TimeSeries => "time_series",
            QueryFormat::Table => "table",
        };
        out.insert("format".into(), json!(format));
    }
    Value::Object(out)
}

fn thresholds_to_json(thresholds: &Thresholds) -> Value {
    let mode = match thresholds.mode {
        ThresholdsMode::Absolute => "absolute",
        ThresholdsMode::Percentage => "percentage",
    };
    let steps: Vec<Value> = thresholds
        .steps
        .iter()
        .map(|step| {
            json!({
                "color": step.color,
                "value": step.value.map(number).unwrap_or(Value::Null),
            })
        })
        .collect();
    json!({ "mode": mode, "steps": steps })
}

fn draw_style_name(style: DrawStyle) -> &'static str {
    match style {
        DrawStyle::Line => "line",
        DrawStyle::Bars => "bars",
        DrawStyle::Points => "points",
    }
}

fn override_to_json(field_override: &FieldOverride) -> Value {
    let matcher = match &field_override.matcher {
        Matcher::ByName(name) => json!({ "id": "byName", "options": name }),
        Matcher::ByFrameRefId(ref_id) => json!({ "id": "byFrameRefID", "options": ref_id }),
    };
    let properties: Vec<Value> = field_override
        .properties
        .iter()
        .map(|property| {
            let (id, value) = match property {
                OverrideProperty::Unit(unit) => ("unit", json!(unit)),
                OverrideProperty::FixedColor(color) => {
                    ("color", json!({ "mode": "fixed", "fixedColor": color }))
                }
                OverrideProperty::ThresholdColor => ("color", json!({ "mode": "thresholds" })),
                OverrideProperty::AxisSoftMin(min) => ("custom.axisSoftMin", number(*min)),
                OverrideProperty::AxisSoftMax(max) => ("custom.axisSoftMax", number(*max)),
                OverrideProperty::AxisPlacement(placement) => {
                    let placement = match placement {
                        AxisPlacement::Left => "left",
                        AxisPlacement::Right => "right",
                    };
                    ("custom.axisPlacement", json!(placement))
                }
                OverrideProperty::DrawStyle(style) => ("custom.drawStyle", json!(draw_style_name(*style))),
                OverrideProperty::FillOpacity(opacity) => ("custom.fillOpacity", json!(opacity)),
                OverrideProperty::LineWidth(width) => ("custom.lineWidth", json!(width)),
            };
            json!({ "id": id, "value": value })
        })
        .collect();
    json!({ "matcher": matcher, "properties": properties })
}

fn legend_to_json(legend: &Legend) -> Value {
    let display_mode = match legend.display_mode {
        LegendDisplayMode::List => "list",
        LegendDisplayMode::Table => "table",
    };
    json!({
        "showLegend": legend.show,
        "displayMode": display_mode,
        "placement": "bottom",
        "calcs": legend.calcs,
    })
}

fn tooltip_to_json(tooltip: &Tooltip) -> Value {
    let mode = match tooltip.mode {
        TooltipMode::Single => "single",
        TooltipMode::Multi => "multi",
    };
    let sort = match tooltip.sort {
        Some(SortOrder::Ascending) => "asc",
        Some(SortOrder::Descending) => "desc",
        None => "none",
    };
    json!({ "mode": mode, "sort": sort })
}

fn reduce_options_to_json(calcs: &[String]) -> Value {
    json!({ "calcs": calcs, "fields": "", "values": false })
}

fn map_layer_to_json(layer: &MapLayer) -> Value {
    let mut out = Map::new();
    out.insert("type".into(), json!(layer.layer_type));
    out.insert("name".into(), json!(layer.name));
    if let Some(location) = &layer.location {
        out.insert(
            "location".into(),
            json!({
                "mode": "coords",
                "latitude": location.latitude,
                "longitude": location.longitude,
            }),
        );
    }
    if let Some(config) = &layer.config {
        out.insert("config".into(), config.clone());
    }
    Value::Object(out)
}

fn geomap_options_to_json(options: &GeomapOptions) -> Value {
    json!({
        "basemap": map_layer_to_json(&options.basemap),
        "layers": options.layers.iter().map(map_layer_to_json).collect::<Vec<_>>(),
        "view": {
            "id": options.view.id,
            "lat": number(options.view.lat),
            "lon": number(options.view.lon),
            "zoom": number(options.view.zoom),
            "allLayers": options.view.all_layers,
        },
    })
}

/// Panel options plus the `fieldConfig.defaults.custom` block, per panel kind.
fn kind_to_json(kind: &PanelKind) -> (Value, Option<Value>) {
    match kind {
        PanelKind::Gauge(options) => {
            let mut out = Map::new();
            out.insert("showThresholdMarkers".into(), json!(true));
            out.insert("showThresholdLabels".into(), json!(false));
            if let Some(calcs) = &options.reduce_calcs {
                out.insert("reduceOptions".into(), reduce_options_to_json(calcs));
            }
            (Value::Object(out), None)
        }
        PanelKind::Stat(options) => {
            let color_mode = match options.color_mode {
                BigValueColorMode::Value => "value",
                BigValueColorMode::Background => "background",
            };
            let graph_mode = match options.graph_mode {
                BigValueGraphMode::None => "none",
                BigValueGraphMode::Area => "area",
            };
            let mut out = Map::new();
            out.insert("colorMode".into(), json!(color_mode));
            out.insert("graphMode".into(), json!(graph_mode));
            if let Some(calcs) = &options.reduce_calcs {
                out.insert("reduceOptions".into(), reduce_options_to_json(calcs));
            }
            (Value::Object(out), None)
        }
        PanelKind::TimeSeries(options) => {
            let mut custom = Map::new();
            custom.insert("drawStyle".into(), json!(draw_style_name(options.draw_style)));
            custom.insert("lineWidth".into(), json!(options.line_width));
            custom.insert("fillOpacity".into(), json!(options.fill_opacity));
            custom.insert("spanNulls".into(), json!(options.span_nulls));
            if let Some(interpolation) = options.line_interpolation {
                let interpolation = match interpolation {
                    LineInterpolation::Linear => "linear",
                    LineInterpolation::Smooth => "smooth",
                    LineInterpolation::StepAfter => "stepAfter",
                };
                custom.insert("lineInterpolation".into(), json!(interpolation));
            }
            if let Some(gradient) = options.gradient_mode {
                let gradient = match gradient {
                    GradientMode::Opacity => "opacity",
                    GradientMode::Scheme => "scheme",
                };
                custom.insert("gradientMode".into(), json!(gradient));
            }

            let mut out = Map::new();
            if let Some(legend) = &options.legend {
                out.insert("legend".into(), legend_to_json(legend));
            }
            if let Some(tooltip) = &options.tooltip {
                out.insert("tooltip".into(), tooltip_to_json(tooltip));
            }
            (Value::Object(out), Some(Value::Object(custom)))
        }
        PanelKind::StateTimeline(options) => {
            let show_value = match options.show_value {
                ValueVisibility::Auto => "auto",
                ValueVisibility::Always => "always",
                ValueVisibility::Never => "never",
            };
            let mut out = Map::new();
            out.insert("mergeValues".into(), json!(options.merge_values));
            out.insert("rowHeight".into(), json!(options.row_height));
            out.insert("showValue".into(), json!(show_value));
            if let Some(legend) = &options.legend {
                out.insert("legend".into(), legend_to_json(legend));
            }
            if let Some(tooltip) = &options.tooltip {
                out.insert("tooltip".into(), tooltip_to_json(tooltip));
            }
            (Value::Object(out), None)
        }
        PanelKind::Geomap(options) => (geomap_options_to_json(options), None),
    }
}

fn panel_to_json(panel: &Panel, id: u32, pos: GridPos) -> Value {
    let (options, custom) = kind_to_json(&panel.kind);

    let mut defaults = Map::new();
    if let Some(unit) = &panel.unit {
        defaults.insert("unit".into(), json!(unit));
    }
    if let Some(min) = panel.min {
        defaults.insert("min".into(), number(min));
    }
    if let Some(max) = panel.max {
        defaults.insert("max".into(), number(max));
    }
    if let Some(decimals) = panel.decimals {
        defaults.insert("decimals".into(), json!(decimals));
    }
    if let Some(thresholds) = &panel.thresholds {
        defaults.insert("thresholds".into(), thresholds_to_json(thresholds));
    }
    if !panel.links.is_empty() {
        defaults.insert(
            "links".into(),
            Value::Array(panel.links.iter().map(link_to_json).collect()),
        );
    }
    if let Some(custom) = custom {
        defaults.insert("custom".into(), custom);
    }

    let mut out = Map::new();
    out.insert("type".into(), json!(panel.kind.plugin_id()));
    out.insert("title".into(), json!(panel.title));
    if let Some(description) = &panel.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(datasource) = &panel.datasource {
        out.insert("datasource".into(), datasource_to_json(datasource));
    }
    out.insert("id".into(), json!(id));
    out.insert("gridPos".into(), grid_pos_to_json(pos));
    out.insert(
        "targets".into(),
        Value::Array(
            panel
                .targets
                .iter()
                .enumerate()
                .map(|(index, target)| target_to_json(target, index))
                .collect(),
        ),
    );
    out.insert(
        "fieldConfig".into(),
        json!({
            "defaults": Value::Object(defaults),
            "overrides": panel.overrides.iter().map(override_to_json).collect::<Vec<_>>(),
        }),
    );
    out.insert("options".into(), options);
    if !panel.transformations.is_empty() {
        let transformations: Vec<Value> = panel
            .transformations
            .iter()
            .map(|t| json!({ "id": t.id, "options": t.options }))
            .collect();
        out.insert("transformations".into(), Value::Array(transformations));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::catalog::DashboardKind;

    #[test]
    fn test_number() {
        assert_eq!(number(100.0), json!(100));
        assert_eq!(number(-150.0), json!(-150));
        assert_eq!(number(0.8), json!(0.8));
    }

    #[test]
    fn test_thresholds_base_step_is_null() {
        let json = thresholds_to_json(&crate::application::shared::battery_thresholds());
        assert_eq!(json["mode"], "absolute");
        assert_eq!(json["steps"][0], json!({ "color": "red", "value": null }));
        assert_eq!(json["steps"][1], json!({ "color": "orange", "value": 20 }));
    }

    #[test]
    fn test_energy_dashboard_document() {
        let json = dashboard_to_json(&DashboardKind::FemsEnergy.build());

        assert_eq!(json["uid"], "fems-energy-whs11");
        assert_eq!(json["time"], json!({ "from": "now/d", "to": "now/d" }));
        assert_eq!(json["templating"]["list"][0]["type"], "datasource");
        assert_eq!(json["templating"]["list"][0]["hide"], 0);

        let panels = json["panels"].as_array().unwrap();
        assert_eq!(panels.len(), 29);
        assert_eq!(panels[0]["type"], "row");
        assert_eq!(panels[0]["gridPos"], json!({ "h": 1, "w": 24, "x": 0, "y": 0 }));

        let soc = &panels[1];
        assert_eq!(soc["type"], "gauge");
        assert_eq!(soc["gridPos"], json!({ "h": 6, "w": 4, "x": 0, "y": 1 }));
        assert_eq!(soc["fieldConfig"]["defaults"]["min"], 0);
        assert_eq!(soc["fieldConfig"]["defaults"]["max"], 100);
        assert_eq!(
            soc["fieldConfig"]["defaults"]["links"][0]["url"],
            "/d/fems-detail-whs11?var-entity=fems81655_sum_esssoc&var-metric=%_value&var-title=Batterie%20(SoC)"
        );
        assert_eq!(soc["targets"][0]["refId"], "A");
        assert!(soc["targets"][0].get("legendFormat").is_none());

        // second row header follows the 6-high gauges
        assert_eq!(panels[4]["type"], "row");
        assert_eq!(panels[4]["gridPos"]["y"], 7);
    }

    #[test]
    fn test_detail_dashboard_overrides() {
        let json = dashboard_to_json(&DashboardKind::VwId7Detail.build());
        let panel = &json["panels"][0];

        assert_eq!(panel["type"], "timeseries");
        assert_eq!(panel["targets"][3]["refId"], "D");
        assert_eq!(panel["targets"][2]["refId"], "C");
        assert_eq!(panel["fieldConfig"]["defaults"]["custom"]["lineInterpolation"], "stepAfter");

        let bars = &panel["fieldConfig"]["overrides"][0];
        assert_eq!(bars["matcher"], json!({ "id": "byFrameRefID", "options": "D" }));
        assert!(bars["properties"]
            .as_array()
            .unwrap()
            .contains(&json!({ "id": "custom.axisSoftMin", "value": -150 })));
        assert!(bars["properties"]
            .as_array()
            .unwrap()
            .contains(&json!({ "id": "color", "value": { "mode": "fixed", "fixedColor": "orange" } })));

        let variables = json["templating"]["list"].as_array().unwrap();
        assert_eq!(variables[1]["type"], "textbox");
        assert_eq!(variables[1]["hide"], 2);
        assert_eq!(json["links"][0]["icon"], "arrow-left");
    }

    #[test]
    fn test_vehicle_layout() {
        let json = dashboard_to_json(&DashboardKind::VwId7.build());
        let ys: Vec<u64> = json["panels"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["gridPos"]["y"].as_u64().unwrap())
            .collect();
        assert_eq!(ys, vec![0, 0, 0, 0, 8, 8, 18, 18, 26, 26, 26, 26, 32]);

        let map = &json["panels"][12];
        assert_eq!(map["type"], "geomap");
        assert_eq!(map["targets"][0]["format"], "table");
        assert_eq!(map["transformations"][0]["id"], "joinByField");
        assert_eq!(map["options"]["view"]["zoom"], 10);
    }
}
