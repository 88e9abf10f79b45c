// VW ID.7 Tourer Pro (Home Assistant Volkswagen Connect sensors)
use crate::application::promql::{Expr, derived_power_kw, selector};
use crate::application::shared::{
    ExtraSeries, RightAxisSeries, battery_thresholds, datasource, datasource_variable, ha_query, range_thresholds,
    vw_detail_link, vw_detail_link_multi,
};
use crate::domain::dashboard::{Dashboard, TimeRange};
use crate::domain::link::DataLink;
use crate::domain::panel::{
    BigValueGraphMode, CoordinateFields, DrawStyle, GaugeOptions, GeomapOptions, Legend, MapLayer, MapView, Panel,
    PanelKind, StatOptions, TimeSeriesOptions, Transformation,
};
use crate::domain::query::{Query, QueryFormat};
use crate::domain::threshold::{ThresholdStep, Thresholds};
use serde_json::json;

pub const UID: &str = "4f115fd3-1e1b-40b2-97d5-8ce33b9be093";

/// Net capacity of the HV battery.
const BATTERY_CAPACITY_KWH: f64 = 77.0;

/// Window for "current" values; the car reports rarely while asleep.
const LATEST: &str = "4h";

const ENTITY_PREFIX: &str = "vw_id_7_tourer_pro_";

fn entity(name: &str) -> String {
    format!("{}{}", ENTITY_PREFIX, name)
}

/// Most recent value of a sensor.
fn latest(metric: &str, name: &str) -> String {
    Expr::last_over_time(metric, &entity(name), LATEST).to_string()
}

fn link(title: &str, metric: &str, name: &str) -> DataLink {
    vw_detail_link(title, metric, &entity(name))
}

/// Single-value tile showing the latest reading of one sensor.
fn sensor_stat(title: &str, description: &str, metric: &str, name: &str, unit: &str, thresholds: Thresholds) -> Panel {
    Panel {
        title: title.to_string(),
        description: Some(description.to_string()),
        datasource: Some(datasource()),
        height: 6,
        span: 6,
        unit: Some(unit.to_string()),
        thresholds: Some(thresholds),
        targets: vec![ha_query(latest(metric, name), None)],
        links: vec![link(title, metric, name)],
        ..Panel::stat()
    }
}

fn without_sparkline() -> PanelKind {
    PanelKind::Stat(StatOptions {
        graph_mode: BigValueGraphMode::None,
        ..StatOptions::default()
    })
}

/// History line of one sensor, legend hidden.
fn history(title: &str, description: &str, metric: &str, name: &str, legend: &str) -> Panel {
    Panel {
        title: title.to_string(),
        description: Some(description.to_string()),
        datasource: Some(datasource()),
        height: 10,
        span: 12,
        targets: vec![ha_query(selector(metric, &entity(name)), Some(legend))],
        ..Panel::new(PanelKind::TimeSeries(TimeSeriesOptions {
            line_width: 2,
            fill_opacity: 20,
            span_nulls: true,
            legend: Some(Legend::hidden()),
            ..TimeSeriesOptions::default()
        }))
    }
}

// Row 1: status overview

fn battery_level_gauge() -> Panel {
    Panel {
        title: "Batteriestand".to_string(),
        description: Some("Aktueller Ladestand der HV-Batterie (77 kWh netto)".to_string()),
        datasource: Some(datasource()),
        height: 8,
        span: 6,
        min: Some(0.0),
        max: Some(100.0),
        unit: Some("percent".to_string()),
        thresholds: Some(battery_thresholds()),
        targets: vec![ha_query(latest("%_value", "battery_level"), None)],
        links: vec![link("Batteriestand", "%_value", "battery_level")],
        ..Panel::new(PanelKind::Gauge(GaugeOptions::default()))
    }
}

fn range_stat() -> Panel {
    Panel {
        height: 8,
        ..sensor_stat(
            "Reichweite",
            "Geschätzte elektrische Restreichweite laut Fahrzeug",
            "km_value",
            "electric_range",
            "lengthkm",
            range_thresholds(),
        )
    }
}

fn odometer_stat() -> Panel {
    Panel {
        height: 8,
        decimals: Some(0),
        ..sensor_stat(
            "Kilometerstand",
            "Gesamtkilometer laut Tacho (Odometer)",
            "km_value",
            "odometer",
            "suffix: km",
            Thresholds::single("blue"),
        )
    }
    .with_kind(PanelKind::Stat(StatOptions {
        graph_mode: BigValueGraphMode::None,
        reduce_calcs: Some(vec!["lastNotNull".to_string()]),
        ..StatOptions::default()
    }))
}

fn service_stat() -> Panel {
    Panel {
        height: 8,
        decimals: Some(0),
        ..sensor_stat(
            "Service in",
            "Tage bis zur nächsten Inspektion laut Serviceplan",
            "d_value",
            "service_inspection_days",
            "suffix: Tage",
            Thresholds::absolute(vec![
                ThresholdStep::base("red"),
                ThresholdStep::at(30.0, "orange"),
                ThresholdStep::at(60.0, "yellow"),
                ThresholdStep::at(90.0, "green"),
            ]),
        )
    }
    .with_kind(without_sparkline())
}

// Row 2: history

fn battery_level_history() -> Panel {
    Panel {
        min: Some(0.0),
        max: Some(100.0),
        unit: Some("percent".to_string()),
        thresholds: Some(battery_thresholds()),
        ..history(
            "Batteriestand (Verlauf)",
            "HV-Batterie Ladestand über Zeit. Datenlücken = Auto im Schlafmodus",
            "%_value",
            "battery_level",
            "Batterie %",
        )
    }
}

fn range_history() -> Panel {
    Panel {
        min: Some(0.0),
        unit: Some("lengthkm".to_string()),
        thresholds: Some(range_thresholds()),
        ..history(
            "Reichweite (Verlauf)",
            "Elektrische Restreichweite über Zeit. Abhängig von Fahrverhalten, Temperatur, Klima",
            "km_value",
            "electric_range",
            "Reichweite km",
        )
    }
}

// Row 3: odometer and charging power

fn odometer_history() -> Panel {
    let base = history(
        "Kilometerstand (Verlauf)",
        "Gesamtkilometer über Zeit. Steigende Flanken = Fahrten",
        "km_value",
        "odometer",
        "km",
    );
    Panel {
        height: 8,
        decimals: Some(0),
        unit: Some("suffix: km".to_string()),
        thresholds: Some(Thresholds::single("blue")),
        ..base
    }
    .with_time_series(|options| options.fill_opacity = 10)
}

fn charging_power_history() -> Panel {
    let base = history(
        "Ladeleistung (Verlauf)",
        "Ladeleistung über Zeit. AC ≈ 11 kW, DC bis 175 kW. Balken = Ladeevent",
        "kW_value",
        "charging_power",
        "kW",
    );
    Panel {
        height: 8,
        min: Some(0.0),
        unit: Some("kwatt".to_string()),
        thresholds: Some(Thresholds::absolute(vec![
            ThresholdStep::base("text"),
            ThresholdStep::at(1.0, "green"),
            ThresholdStep::at(50.0, "yellow"),
            ThresholdStep::at(100.0, "orange"),
        ])),
        ..base
    }
    .with_time_series(|options| {
        options.fill_opacity = 30;
        options.draw_style = DrawStyle::Bars;
        options.span_nulls = false;
    })
}

// Row 4: charging and battery details

fn charging_power_stat() -> Panel {
    sensor_stat(
        "Ladeleistung",
        "Aktuelle Ladeleistung laut VW API. 0 kW = nicht am Ladekabel",
        "kW_value",
        "charging_power",
        "kwatt",
        Thresholds::absolute(vec![ThresholdStep::base("text"), ThresholdStep::at(1.0, "green")]),
    )
}

fn charging_time_left_stat() -> Panel {
    sensor_stat(
        "Restladezeit",
        "Geschätzte Restdauer bis zum Ziel-Ladestand",
        "min_value",
        "charging_time_left",
        "m",
        Thresholds::single("text"),
    )
    .with_kind(without_sparkline())
}

fn battery_temperature_stat() -> Panel {
    let max = entity("hv_battery_max_temperature");
    let min = entity("hv_battery_min_temperature");
    let average = (Expr::last_over_time("°C_value", &max, LATEST).scalar()
        + Expr::last_over_time("°C_value", &min, LATEST).scalar())
        / 2.0;

    let outdoor = entity("outdoor_temperature");
    let derived = derived_power_kw(&entity("battery_level"), "15m", BATTERY_CAPACITY_KWH).to_string();
    let charging = selector("kW_value", &entity("charging_power"));

    Panel {
        title: "Batterie-Temperatur".to_string(),
        description: Some(
            "Mittelwert aus Min/Max HV-Batterie-Temperatur. Detail: Min, Max, Außentemp, Lade-/Entladeleistung"
                .to_string(),
        ),
        datasource: Some(datasource()),
        height: 6,
        span: 6,
        unit: Some("celsius".to_string()),
        thresholds: Some(Thresholds::absolute(vec![
            ThresholdStep::base("blue"),
            ThresholdStep::at(15.0, "green"),
            ThresholdStep::at(35.0, "orange"),
            ThresholdStep::at(45.0, "red"),
        ])),
        targets: vec![ha_query(average.to_string(), Some("Ø"))],
        links: vec![vw_detail_link_multi(
            "Max",
            "°C_value",
            &max,
            &min,
            "Min",
            Some(ExtraSeries {
                entity: &outdoor,
                metric: "°C_value",
                legend: "Außentemperatur",
            }),
            Some(RightAxisSeries {
                expr: &derived,
                legend: "Leistung abgeleitet (kW)",
            }),
            Some(RightAxisSeries {
                expr: &charging,
                legend: "Ladeleistung (kW)",
            }),
        )],
        ..Panel::stat()
    }
}

fn target_charge_level_stat() -> Panel {
    sensor_stat(
        "Ziel-Ladestand",
        "Eingestellter Ziel-Ladestand (Target SoC) für AC-Laden",
        "%_value",
        "battery_target_charge_level",
        "percent",
        Thresholds::single("green"),
    )
    .with_kind(without_sparkline())
}

// Row 5: parking position

fn position_query(name: &str, legend: &str, ref_id: &str) -> Query {
    ha_query(selector("°_value", &entity(name)), Some(legend))
        .with_format(QueryFormat::Table)
        .with_ref_id(ref_id)
}

fn parking_position_map() -> Panel {
    Panel {
        title: "Parkposition".to_string(),
        description: Some("Letzte bekannte GPS-Position des Fahrzeugs (VW API)".to_string()),
        datasource: Some(datasource()),
        height: 12,
        span: 24,
        targets: vec![
            position_query("latitude", "latitude", "A"),
            position_query("longitude", "longitude", "B"),
        ],
        transformations: vec![
            Transformation {
                id: "joinByField".to_string(),
                options: json!({ "byField": "Time", "mode": "outer" }),
            },
            Transformation {
                id: "organize".to_string(),
                options: json!({
                    "renameByName": {
                        "Value #A": "latitude",
                        "Value #B": "longitude",
                    }
                }),
            },
        ],
        ..Panel::new(PanelKind::Geomap(GeomapOptions {
            basemap: MapLayer {
                layer_type: "osm-standard".to_string(),
                name: "OpenStreetMap".to_string(),
                location: None,
                config: None,
            },
            layers: vec![MapLayer {
                layer_type: "markers".to_string(),
                name: "Positionen".to_string(),
                location: Some(CoordinateFields {
                    latitude: "latitude".to_string(),
                    longitude: "longitude".to_string(),
                }),
                config: Some(json!({
                    "showLegend": false,
                    "style": {
                        "color": { "fixed": "blue" },
                        "opacity": 0.6,
                        "size": { "fixed": 5 },
                    }
                })),
            }],
            view: MapView {
                id: "fit".to_string(),
                lat: 49.45,
                lon: 11.04,
                zoom: 10.0,
                all_layers: true,
            },
        }))
    }
}

pub fn build() -> Dashboard {
    Dashboard {
        tags: ["vw", "ev", "car"].iter().map(|t| t.to_string()).collect(),
        refresh: "5m".to_string(),
        time: TimeRange::new("now-24h", "now"),
        variables: vec![datasource_variable()],
        ..Dashboard::new(UID, "VW ID.7 Tourer Pro")
    }
    // Row 1
    .with_panel(battery_level_gauge())
    .with_panel(range_stat())
    .with_panel(odometer_stat())
    .with_panel(service_stat())
    // Row 2
    .with_panel(battery_level_history())
    .with_panel(range_history())
    // Row 3
    .with_panel(odometer_history())
    .with_panel(charging_power_history())
    // Row 4
    .with_panel(charging_power_stat())
    .with_panel(charging_time_left_stat())
    .with_panel(battery_temperature_stat())
    .with_panel(target_charge_level_stat())
    // Row 5
    .with_panel(parking_position_map())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::url_encoding::{decode_component, query_pairs};

    #[test]
    fn test_builds_valid_dashboard() {
        let dashboard = build();
        assert_eq!(dashboard.validate(), Ok(()));
        assert_eq!(dashboard.panels().count(), 13);
    }

    #[test]
    fn test_battery_temperature_averages_min_and_max() {
        let panel = battery_temperature_stat();
        assert_eq!(
            panel.targets[0].expr,
            concat!(
                r#"(scalar(last_over_time({__name__="°C_value", entity_id="vw_id_7_tourer_pro_hv_battery_max_temperature"}[4h]))"#,
                r#" + scalar(last_over_time({__name__="°C_value", entity_id="vw_id_7_tourer_pro_hv_battery_min_temperature"}[4h]))) / 2"#,
            )
        );
    }

    #[test]
    fn test_battery_temperature_link_carries_derived_power() {
        let panel = battery_temperature_stat();
        let expr4 = query_pairs(&panel.links[0].url)
            .into_iter()
            .find(|(name, _)| *name == "var-expr4")
            .map(|(_, value)| decode_component(value).into_owned());
        assert_eq!(
            expr4.as_deref(),
            Some(r#"deriv({__name__="%_value", entity_id="vw_id_7_tourer_pro_battery_level"}[15m]) * 2772"#)
        );
    }

    #[test]
    fn test_charging_history_draws_bars() {
        let PanelKind::TimeSeries(options) = charging_power_history().kind else {
            panic!("expected a time series");
        };
        assert_eq!(options.draw_style, DrawStyle::Bars);
        assert!(!options.span_nulls);
        assert_eq!(options.fill_opacity, 30);
    }

    #[test]
    fn test_position_queries_are_tables() {
        let map = parking_position_map();
        assert_eq!(map.ref_ids(), vec!["A", "B"]);
        assert!(map.targets.iter().all(|t| t.format == Some(QueryFormat::Table)));
        assert_eq!(map.transformations.len(), 2);
    }
}
