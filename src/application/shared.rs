// Shared query and drilldown-link helpers
use crate::domain::dashboard::{Variable, VariableHide, VariableKind};
use crate::domain::link::DataLink;
use crate::domain::query::{DatasourceRef, Query};
use crate::domain::threshold::{ThresholdStep, Thresholds};
use crate::infrastructure::url_encoding::DashboardUrl;

/// Dashboard variable holding the Prometheus-compatible data source.
pub const DATASOURCE_VAR: &str = "datasource";

pub const DETAIL_DASHBOARD_UID: &str = "fems-detail-whs11";
pub const VW_DETAIL_DASHBOARD_UID: &str = "vw-id7-detail";

const DETAIL_LINK_TITLE: &str = "Detailansicht";

pub fn datasource() -> DatasourceRef {
    DatasourceRef {
        kind: "prometheus".to_string(),
        uid: format!("${}", DATASOURCE_VAR),
    }
}

pub fn datasource_variable() -> Variable {
    Variable {
        name: DATASOURCE_VAR.to_string(),
        label: "Data source".to_string(),
        hide: VariableHide::Shown,
        kind: VariableKind::Datasource {
            plugin: "prometheus".to_string(),
        },
    }
}

/// Query against the shared data source. Without a legend the backend names the series.
pub fn ha_query(expr: impl Into<String>, legend: Option<&str>) -> Query {
    let query = Query::new(datasource(), expr);
    match legend {
        Some(legend) => query.with_legend(legend),
        None => query,
    }
}

fn detail(url: String) -> DataLink {
    DataLink::new(DETAIL_LINK_TITLE, url)
        .keep_time(true)
        .include_vars(true)
}

/// Drilldown to one literal series on the energy detail dashboard.
pub fn detail_link(title: &str, metric: &str, entity: &str) -> DataLink {
    detail(
        DashboardUrl::new(DETAIL_DASHBOARD_UID)
            .identifier("entity", entity)
            .identifier("metric", metric)
            .text("title", title)
            .finish(),
    )
}

/// Drilldown to a computed expression instead of a raw series.
pub fn detail_expr_link(title: &str, expr: &str, unit: Option<&str>) -> DataLink {
    detail(
        DashboardUrl::new(DETAIL_DASHBOARD_UID)
            .text("expr", expr)
            .text("title", title)
            .optional_text("unit", unit)
            .finish(),
    )
}

/// Drilldown to one literal series on the vehicle detail dashboard.
pub fn vw_detail_link(title: &str, metric: &str, entity: &str) -> DataLink {
    detail(
        DashboardUrl::new(VW_DETAIL_DASHBOARD_UID)
            .identifier("entity", entity)
            .identifier("metric", metric)
            .text("title", title)
            .finish(),
    )
}

/// Third left-axis series, possibly under a different metric.
#[derive(Debug, Clone, Copy)]
pub struct ExtraSeries<'a> {
    pub entity: &'a str,
    pub metric: &'a str,
    pub legend: &'a str,
}

/// Expression drawn against the right axis.
#[derive(Debug, Clone, Copy)]
pub struct RightAxisSeries<'a> {
    pub expr: &'a str,
    pub legend: &'a str,
}

/// Vehicle drilldown comparing up to five series: two entities of the same
/// metric, an optional third series and up to two right-axis expressions.
#[allow(clippy::too_many_arguments)]
pub fn vw_detail_link_multi(
    title: &str,
    metric: &str,
    entity: &str,
    entity2: &str,
    legend2: &str,
    series3: Option<ExtraSeries<'_>>,
    right_axis: Option<RightAxisSeries<'_>>,
    right_axis2: Option<RightAxisSeries<'_>>,
) -> DataLink {
    let mut url = DashboardUrl::new(VW_DETAIL_DASHBOARD_UID)
        .identifier("entity", entity)
        .identifier("entity2", entity2)
        .identifier("metric", metric)
        .text("title", title)
        .text("legend2", legend2);

    if let Some(series) = series3 {
        url = url
            .identifier("entity3", series.entity)
            .identifier("metric3", series.metric)
            .text("legend3", series.legend);
    }
    if let Some(axis) = right_axis {
        url = url.text("expr4", axis.expr).text("legend4", axis.legend);
    }
    if let Some(axis) = right_axis2 {
        url = url.text("expr5", axis.expr).text("legend5", axis.legend);
    }

    detail(url.finish())
}

/// Back link from a detail dashboard to its overview.
pub fn back_link(title: &str, uid: &str) -> DataLink {
    DataLink::new(title, format!("/d/{}", uid))
        .keep_time(true)
        .include_vars(false)
        .icon("arrow-left")
}

/// Vehicle battery level ramp.
pub fn battery_thresholds() -> Thresholds {
    Thresholds::absolute(vec![
        ThresholdStep::base("red"),
        ThresholdStep::at(20.0, "orange"),
        ThresholdStep::at(40.0, "yellow"),
        ThresholdStep::at(60.0, "green"),
    ])
}

/// Vehicle range ramp in km.
pub fn range_thresholds() -> Thresholds {
    Thresholds::absolute(vec![
        ThresholdStep::base("red"),
        ThresholdStep::at(50.0, "orange"),
        ThresholdStep::at(100.0, "yellow"),
        ThresholdStep::at(200.0, "green"),
    ])
}
