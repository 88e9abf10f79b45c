// VW ID.7 drilldown with up to three left-axis and two right-axis series
//
// A: $entity/$metric, B: $entity2/$metric (legend2), C: $entity3/$metric3
// (legend3), D: $expr4 (legend4) as bars, E: $expr5 (legend5) as line.
use crate::application::promql::selector;
use crate::application::shared::{VW_DETAIL_DASHBOARD_UID, back_link, datasource, datasource_variable, ha_query};
use crate::application::vw_id7;
use crate::domain::dashboard::{Dashboard, TimeRange, Variable};
use crate::domain::panel::{
    AxisPlacement, DrawStyle, FieldOverride, Legend, LineInterpolation, OverrideProperty, Panel, PanelKind,
    TimeSeriesOptions, Tooltip,
};

pub const UID: &str = VW_DETAIL_DASHBOARD_UID;

/// Soft range shared by both right-axis series, in kW.
const RIGHT_AXIS_RANGE: f64 = 150.0;

fn right_axis(ref_id: &str, draw_style: DrawStyle, fill_opacity: u32, line_width: u32, color: &str) -> FieldOverride {
    FieldOverride::by_ref_id(
        ref_id,
        vec![
            OverrideProperty::AxisPlacement(AxisPlacement::Right),
            OverrideProperty::Unit("kwatt".to_string()),
            OverrideProperty::DrawStyle(draw_style),
            OverrideProperty::FillOpacity(fill_opacity),
            OverrideProperty::LineWidth(line_width),
            OverrideProperty::FixedColor(color.to_string()),
            OverrideProperty::AxisSoftMin(-RIGHT_AXIS_RANGE),
            OverrideProperty::AxisSoftMax(RIGHT_AXIS_RANGE),
        ],
    )
}

fn detail_panel() -> Panel {
    Panel {
        title: "$title".to_string(),
        datasource: Some(datasource()),
        height: 20,
        span: 24,
        targets: vec![
            ha_query(selector("$metric", "$entity"), Some("$title")),
            ha_query(selector("$metric", "$entity2"), Some("$legend2")),
            ha_query(selector("$metric3", "$entity3"), Some("$legend3")),
            ha_query("$expr4", Some("$legend4")).with_ref_id("D"),
            ha_query("$expr5", Some("$legend5")).with_ref_id("E"),
        ],
        overrides: vec![
            right_axis("D", DrawStyle::Bars, 40, 0, "orange"),
            right_axis("E", DrawStyle::Line, 0, 2, "#00e5ff"),
        ],
        ..Panel::new(PanelKind::TimeSeries(TimeSeriesOptions {
            line_width: 2,
            fill_opacity: 0,
            line_interpolation: Some(LineInterpolation::StepAfter),
            span_nulls: true,
            legend: Some(Legend::table(&["lastNotNull", "min", "max", "mean"])),
            tooltip: Some(Tooltip::multi_descending()),
            ..TimeSeriesOptions::default()
        }))
    }
}

pub fn build() -> Dashboard {
    Dashboard {
        description: Some("Detailansicht einer gewählten Metrik".to_string()),
        tags: ["vw", "ev", "car", "detail"].iter().map(|t| t.to_string()).collect(),
        refresh: "5m".to_string(),
        time: TimeRange::new("now-24h", "now"),
        variables: vec![
            datasource_variable(),
            Variable::hidden_text("entity", "Entity"),
            Variable::hidden_text("metric", "Metric"),
            Variable::hidden_text("title", "Title"),
            Variable::hidden_text("entity2", "Entity 2"),
            Variable::hidden_text("legend2", "Legend 2"),
            Variable::hidden_text("entity3", "Entity 3"),
            Variable::hidden_text("metric3", "Metric 3"),
            Variable::hidden_text("legend3", "Legend 3"),
            Variable::hidden_text("expr4", "Right Axis Expr"),
            Variable::hidden_text("legend4", "Right Axis Legend"),
            Variable::hidden_text("expr5", "Right Axis Expr 2"),
            Variable::hidden_text("legend5", "Right Axis Legend 2"),
        ],
        links: vec![back_link("← VW ID.7 Tourer Pro", vw_id7::UID)],
        ..Dashboard::new(UID, "VW ID.7 Detail")
    }
    .with_panel(detail_panel())
}
