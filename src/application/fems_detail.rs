// FENECON drilldown: one chart whose series come from URL variables
//
// var-entity / var-metric select a literal series, var-expr carries a computed
// expression (e.g. Autarkie), var-title labels both, var-unit is informational.
use crate::application::fems_energy;
use crate::application::promql::selector;
use crate::application::shared::{DETAIL_DASHBOARD_UID, back_link, datasource, datasource_variable, ha_query};
use crate::domain::dashboard::{Dashboard, TimeRange, Variable};
use crate::domain::panel::{
    FieldOverride, Legend, LineInterpolation, OverrideProperty, Panel, PanelKind, TimeSeriesOptions, Tooltip,
};

pub const UID: &str = DETAIL_DASHBOARD_UID;

fn detail_panel() -> Panel {
    Panel {
        title: "$title".to_string(),
        datasource: Some(datasource()),
        height: 20,
        span: 24,
        targets: vec![
            // literal series path
            ha_query(selector("$metric", "$entity"), Some("$title")),
            // computed expression path
            ha_query("$expr", Some("$title")).with_ref_id("B"),
        ],
        overrides: vec![FieldOverride::by_ref_id(
            "B",
            vec![
                OverrideProperty::Unit("percent".to_string()),
                OverrideProperty::AxisSoftMin(0.0),
                OverrideProperty::AxisSoftMax(100.0),
            ],
        )],
        ..Panel::new(PanelKind::TimeSeries(TimeSeriesOptions {
            line_width: 2,
            fill_opacity: 25,
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
        tags: ["fenecon", "energy", "detail", "whs-11"]
            .iter()
            .map(|t| t.to_string())
            .collect(),
        refresh: "30s".to_string(),
        time: TimeRange::new("now/d", "now/d"),
        variables: vec![
            datasource_variable(),
            Variable::hidden_text("entity", "Entity"),
            Variable::hidden_text("metric", "Metric"),
            Variable::hidden_text("title", "Title"),
            Variable::hidden_text("expr", "Expression"),
            Variable::hidden_text("unit", "Unit"),
        ],
        links: vec![back_link("← Energiemonitor", fems_energy::UID)],
        ..Dashboard::new(UID, "FENECON Detail")
    }
    .with_panel(detail_panel())
}
