// FENECON FEMS energy monitor (WHS-11 Erlangen: FEMS fems81655, GoodWe hybrid, KEBA P40)
use crate::application::promql::{EnergyMeters, Expr, energy_kwh, selector};
use crate::application::shared::{datasource, datasource_variable, detail_expr_link, detail_link, ha_query};
use crate::domain::dashboard::{Dashboard, TimeRange};
use crate::domain::panel::{
    BigValueGraphMode, FieldOverride, GaugeOptions, GradientMode, Legend, LineInterpolation, OverrideProperty, Panel, PanelKind,
    StatOptions, StateTimelineOptions, TimeSeriesOptions, Tooltip, ValueVisibility,
};
use crate::domain::threshold::{ThresholdStep, Thresholds};

pub const UID: &str = "fems-energy-whs11";

mod colors {
    pub const PV: &str = "#3498db";
    pub const PV_LIGHT: &str = "#5dade2";
    pub const BATTERY: &str = "#2ecc71";
    pub const DISCHARGE: &str = "#e74c3c";
    pub const GRID_BUY: &str = "#7f8c8d";
    pub const GRID_SELL: &str = "#9b59b6";
    pub const CONSUMPTION: &str = "#f39c12";
    pub const EVCS: &str = "#1abc9c";
    pub const IDLE: &str = "#7f8c8d";
}

mod entity {
    pub const SOC: &str = "fems81655_sum_esssoc";
    pub const PRODUCTION_POWER: &str = "fems81655_sum_productionactivepower";
    pub const CONSUMPTION_POWER: &str = "fems81655_sum_consumptionactivepower";
    pub const GRID_POWER: &str = "fems81655_sum_gridactivepower";
    pub const ESS_POWER: &str = "fems81655_sum_essactivepower";
    pub const GRID_BUY_ENERGY: &str = "fems81655_sum_gridbuyactiveenergy";
    pub const GRID_SELL_ENERGY: &str = "fems81655_sum_gridsellactiveenergy";
    pub const PRODUCTION_ENERGY: &str = "fems81655_sum_productionactiveenergy";
    pub const ESS_CHARGE_ENERGY: &str = "fems81655_sum_essdcchargeenergy";
    pub const ESS_DISCHARGE_ENERGY: &str = "fems81655_sum_essdcdischargeenergy";
    pub const MPPT1_POWER: &str = "fems81655_charger0_actualpower";
    pub const MPPT2_POWER: &str = "fems81655_charger1_actualpower";
    pub const EVCS_POWER: &str = "fems81655_evcs0_chargepower";
    pub const EVCS_SESSION_ENERGY: &str = "fems81655_evcs0_energysession";
}

const METERS: EnergyMeters<'static> = EnergyMeters {
    grid_buy: entity::GRID_BUY_ENERGY,
    grid_sell: entity::GRID_SELL_ENERGY,
    production: entity::PRODUCTION_ENERGY,
};

fn soc_thresholds() -> Thresholds {
    Thresholds::absolute(vec![
        ThresholdStep::base("#e74c3c"),
        ThresholdStep::at(20.0, "#f39c12"),
        ThresholdStep::at(40.0, "#f1c40f"),
        ThresholdStep::at(60.0, "#2ecc71"),
    ])
}

fn ratio_thresholds() -> Thresholds {
    Thresholds::absolute(vec![
        ThresholdStep::base("#e74c3c"),
        ThresholdStep::at(30.0, "#f39c12"),
        ThresholdStep::at(50.0, "#f1c40f"),
        ThresholdStep::at(70.0, "#2ecc71"),
    ])
}

fn calcs(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(|c| c.to_string()).collect())
}

fn last_not_null() -> Option<Vec<String>> {
    calcs(&["lastNotNull"])
}

fn stat(reduce_calcs: Option<Vec<String>>) -> PanelKind {
    PanelKind::Stat(StatOptions {
        reduce_calcs,
        ..StatOptions::default()
    })
}

fn percent_gauge(title: &str, description: &str, thresholds: Thresholds) -> Panel {
    Panel {
        title: title.to_string(),
        description: Some(description.to_string()),
        datasource: Some(datasource()),
        height: 6,
        span: 4,
        min: Some(0.0),
        max: Some(100.0),
        unit: Some("percent".to_string()),
        thresholds: Some(thresholds),
        ..Panel::new(PanelKind::Gauge(GaugeOptions {
            reduce_calcs: last_not_null(),
        }))
    }
}

/// Live power reading in W with a sparkline.
fn power_stat(title: &str, description: &str, entity: &str, legend: &str, thresholds: Thresholds) -> Panel {
    Panel {
        title: title.to_string(),
        description: Some(description.to_string()),
        datasource: Some(datasource()),
        height: 4,
        span: 6,
        unit: Some("watt".to_string()),
        decimals: Some(0),
        thresholds: Some(thresholds),
        targets: vec![ha_query(selector("W_value", entity), Some(legend))],
        ..Panel::new(stat(last_not_null()))
    }
}

/// Energy over the selected range; the sparkline shows kWh per interval.
fn energy_stat(title: &str, description: &str, expr: Expr, thresholds: Thresholds) -> Panel {
    Panel {
        title: title.to_string(),
        description: Some(description.to_string()),
        datasource: Some(datasource()),
        height: 5,
        span: 6,
        unit: Some("kwatth".to_string()),
        decimals: Some(1),
        thresholds: Some(thresholds),
        targets: vec![ha_query(expr.to_string(), Some("kWh"))],
        ..Panel::new(stat(calcs(&["sum"])))
    }
}

// Row: Status

fn battery_soc_gauge() -> Panel {
    Panel {
        targets: vec![ha_query(
            Expr::last_over_time("%_value", entity::SOC, "5m").to_string(),
            None,
        )],
        links: vec![detail_link("Batterie (SoC)", "%_value", entity::SOC)],
        ..percent_gauge("Batterie", "Aktueller Ladestand des Speichers", soc_thresholds())
    }
}

fn self_sufficiency_gauge() -> Panel {
    Panel {
        targets: vec![ha_query(
            METERS.self_sufficiency("$__range").to_string(),
            Some("Autarkie %"),
        )],
        links: vec![detail_expr_link(
            "Autarkie",
            &METERS.self_sufficiency("$__interval").to_string(),
            Some("percent"),
        )],
        ..percent_gauge(
            "Autarkie",
            "Anteil des Verbrauchs aus eigener Erzeugung im gewählten Zeitraum",
            ratio_thresholds(),
        )
    }
}

fn self_consumption_gauge() -> Panel {
    Panel {
        targets: vec![ha_query(
            METERS.self_consumption("$__range").to_string(),
            Some("Eigenverbrauch %"),
        )],
        links: vec![detail_expr_link(
            "Eigenverbrauch",
            &METERS.self_consumption("$__interval").to_string(),
            Some("percent"),
        )],
        ..percent_gauge(
            "Eigenverbrauch",
            "Anteil der Erzeugung, die selbst verbraucht wird, im gewählten Zeitraum",
            ratio_thresholds(),
        )
    }
}

// Row: Aktuelle Leistung

fn pv_power_stat() -> Panel {
    Panel {
        links: vec![detail_link("Erzeugung (PV)", "W_value", entity::PRODUCTION_POWER)],
        ..power_stat(
            "Erzeugung",
            "Aktuelle PV-Leistung beider MPPT-Strings (GoodWe Hybrid-Wechselrichter)",
            entity::PRODUCTION_POWER,
            "PV",
            Thresholds::absolute(vec![ThresholdStep::base(colors::IDLE), ThresholdStep::at(100.0, colors::PV)]),
        )
    }
}

fn consumption_power_stat() -> Panel {
    Panel {
        links: vec![detail_link("Verbrauch", "W_value", entity::CONSUMPTION_POWER)],
        ..power_stat(
            "Verbrauch",
            "Aktueller Gesamtverbrauch des Haushalts (inkl. Wallbox)",
            entity::CONSUMPTION_POWER,
            "Verbrauch",
            Thresholds::single(colors::CONSUMPTION),
        )
    }
}

fn grid_power_stat() -> Panel {
    // positive = import, negative = export
    Panel {
        links: vec![detail_link("Netz", "W_value", entity::GRID_POWER)],
        ..power_stat(
            "Netz",
            "Positiv = Bezug, Negativ = Einspeisung",
            entity::GRID_POWER,
            "Netz",
            Thresholds::absolute(vec![
                ThresholdStep::base(colors::GRID_SELL),
                ThresholdStep::at(0.0, colors::GRID_BUY),
            ]),
        )
    }
}

fn battery_power_stat() -> Panel {
    // positive = discharge, negative = charge
    Panel {
        links: vec![detail_link("Speicher", "W_value", entity::ESS_POWER)],
        ..power_stat(
            "Speicher",
            "Positiv = Entladung, Negativ = Beladung",
            entity::ESS_POWER,
            "Speicher",
            Thresholds::absolute(vec![
                ThresholdStep::base(colors::BATTERY),
                ThresholdStep::at(0.0, colors::DISCHARGE),
            ]),
        )
    }
}

// Row: Energiemonitor

fn energy_monitor_chart() -> Panel {
    let series = [
        ("Erzeugung", Expr::series("W_value", entity::PRODUCTION_POWER), colors::PV),
        ("Verbrauch", Expr::series("W_value", entity::CONSUMPTION_POWER), colors::CONSUMPTION),
        ("Speicher", Expr::series("W_value", entity::ESS_POWER).abs(), colors::BATTERY),
        ("Bezug", Expr::series("W_value", entity::GRID_POWER).clamp_min(0.0), colors::GRID_BUY),
        ("Einspeisung", -Expr::series("W_value", entity::GRID_POWER).clamp_max(0.0), colors::GRID_SELL),
        ("Wallbox", Expr::series("W_value", entity::EVCS_POWER), colors::EVCS),
    ];

    Panel {
        title: "Energiemonitor".to_string(),
        description: Some("Leistungsflüsse im Zeitverlauf mit Batterie-Ladestand".to_string()),
        datasource: Some(datasource()),
        height: 12,
        span: 24,
        min: Some(0.0),
        targets: series
            .iter()
            .map(|(legend, expr, _)| ha_query(expr.to_string(), Some(*legend)))
            .collect(),
        overrides: series
            .iter()
            .map(|(legend, _, color)| FieldOverride::series_color(legend, color))
            .collect(),
        ..Panel::new(PanelKind::TimeSeries(TimeSeriesOptions {
            line_width: 2,
            fill_opacity: 30,
            line_interpolation: Some(LineInterpolation::StepAfter),
            span_nulls: true,
            legend: Some(Legend::table(&["lastNotNull", "max", "mean"])),
            tooltip: Some(Tooltip::multi_descending()),
            ..TimeSeriesOptions::default()
        }))
    }
}

// Row: Batterie

fn soc_timeline() -> Panel {
    Panel {
        title: "Batterie-Ladestand".to_string(),
        description: Some(
            "State of Charge (SoC) des Hausspeichers im Zeitverlauf, Farbe nach Ladestand".to_string(),
        ),
        datasource: Some(datasource()),
        height: 6,
        span: 24,
        min: Some(0.0),
        max: Some(100.0),
        unit: Some("percent".to_string()),
        thresholds: Some(soc_thresholds()),
        targets: vec![ha_query(selector("%_value", entity::SOC), Some("SoC"))],
        overrides: vec![FieldOverride::by_name("SoC", vec![OverrideProperty::ThresholdColor])],
        ..Panel::new(PanelKind::TimeSeries(TimeSeriesOptions {
            line_width: 3,
            fill_opacity: 20,
            line_interpolation: Some(LineInterpolation::StepAfter),
            gradient_mode: Some(GradientMode::Scheme),
            span_nulls: true,
            legend: Some(Legend::hidden()),
            ..TimeSeriesOptions::default()
        }))
    }
}

// Row: Energie Σ

fn production_energy_stat() -> Panel {
    Panel {
        links: vec![detail_link("Erzeugung (PV)", "W_value", entity::PRODUCTION_POWER)],
        ..energy_stat(
            "Erzeugung Σ",
            "PV-Ertrag im gewählten Zeitraum. Sparkline zeigt Leistungsprofil (kWh pro Intervall)",
            energy_kwh(entity::PRODUCTION_ENERGY, "$__interval"),
            Thresholds::absolute(vec![ThresholdStep::base(colors::IDLE), ThresholdStep::at(1.0, colors::PV)]),
        )
    }
}

fn consumption_energy_stat() -> Panel {
    Panel {
        links: vec![detail_link("Verbrauch", "W_value", entity::CONSUMPTION_POWER)],
        ..energy_stat(
            "Verbrauch Σ",
            "Gesamtverbrauch im gewählten Zeitraum (Erzeugung + Bezug − Einspeisung). Sparkline zeigt Verbrauchsprofil",
            METERS.consumption_kwh("$__interval"),
            Thresholds::single(colors::CONSUMPTION),
        )
    }
}

fn grid_buy_energy_stat() -> Panel {
    Panel {
        links: vec![detail_link("Netz (Bezug)", "W_value", entity::GRID_POWER)],
        ..energy_stat(
            "Bezug Σ",
            "Netzbezug im gewählten Zeitraum. Sparkline zeigt Bezugsprofil",
            energy_kwh(entity::GRID_BUY_ENERGY, "$__interval"),
            Thresholds::single(colors::GRID_BUY),
        )
    }
}

fn grid_sell_energy_stat() -> Panel {
    Panel {
        links: vec![detail_link("Netz (Einspeisung)", "W_value", entity::GRID_POWER)],
        ..energy_stat(
            "Einspeisung Σ",
            "Netzeinspeisung im gewählten Zeitraum. Sparkline zeigt Einspeiseprofil",
            energy_kwh(entity::GRID_SELL_ENERGY, "$__interval"),
            Thresholds::single(colors::GRID_SELL),
        )
    }
}

// Row: Speicher & PV-Strings

fn battery_charge_energy_stat() -> Panel {
    Panel {
        links: vec![detail_link("Speicher", "W_value", entity::ESS_POWER)],
        ..energy_stat(
            "Batterie geladen Σ",
            "Ladeenergie des Speichers im gewählten Zeitraum (DC-seitig). Sparkline zeigt Ladeprofil",
            energy_kwh(entity::ESS_CHARGE_ENERGY, "$__interval"),
            Thresholds::single(colors::BATTERY),
        )
    }
}

fn battery_discharge_energy_stat() -> Panel {
    Panel {
        links: vec![detail_link("Speicher", "W_value", entity::ESS_POWER)],
        ..energy_stat(
            "Batterie entladen Σ",
            "Entladeenergie des Speichers im gewählten Zeitraum (DC-seitig). Sparkline zeigt Entladeprofil",
            energy_kwh(entity::ESS_DISCHARGE_ENERGY, "$__interval"),
            Thresholds::single(colors::DISCHARGE),
        )
    }
}

fn mppt_stat(index: u8, entity: &str, color: &str) -> Panel {
    let title = format!("MPPT {}", index);
    Panel {
        height: 5,
        links: vec![detail_link(&title, "W_value", entity)],
        ..power_stat(
            &title,
            &format!("String {} aktuelle Leistung", index),
            entity,
            &title,
            Thresholds::absolute(vec![ThresholdStep::base(colors::IDLE), ThresholdStep::at(50.0, color)]),
        )
    }
}

// Row: KEBA Wallbox

fn wallbox_power_stat() -> Panel {
    Panel {
        height: 5,
        span: 12,
        links: vec![detail_link("Wallbox Ladeleistung", "W_value", entity::EVCS_POWER)],
        ..power_stat(
            "Wallbox Ladeleistung",
            "Aktuelle Ladeleistung der KEBA P40 Wallbox",
            entity::EVCS_POWER,
            "KEBA",
            Thresholds::absolute(vec![ThresholdStep::base(colors::IDLE), ThresholdStep::at(100.0, colors::EVCS)]),
        )
    }
}

fn wallbox_session_energy_stat() -> Panel {
    Panel {
        title: "Session Energie".to_string(),
        description: Some("Aktuelle Ladesession".to_string()),
        datasource: Some(datasource()),
        height: 5,
        span: 12,
        unit: Some("kwatth".to_string()),
        decimals: Some(2),
        thresholds: Some(Thresholds::single(colors::EVCS)),
        targets: vec![ha_query(
            (Expr::series("Wh_value", entity::EVCS_SESSION_ENERGY) / 1000.0).to_string(),
            Some("kWh"),
        )],
        links: vec![detail_link("Wallbox Ladeleistung", "W_value", entity::EVCS_POWER)],
        ..Panel::new(PanelKind::Stat(StatOptions {
            graph_mode: BigValueGraphMode::None,
            reduce_calcs: last_not_null(),
            ..StatOptions::default()
        }))
    }
}

fn wallbox_charging_chart() -> Panel {
    Panel {
        title: "Ladeverlauf".to_string(),
        description: Some("Ladeleistung der KEBA P40 im Zeitverlauf".to_string()),
        datasource: Some(datasource()),
        height: 6,
        span: 24,
        min: Some(0.0),
        unit: Some("watt".to_string()),
        targets: vec![ha_query(selector("W_value", entity::EVCS_POWER), Some("Ladeleistung"))],
        overrides: vec![FieldOverride::series_color("Ladeleistung", colors::EVCS)],
        ..Panel::new(PanelKind::TimeSeries(TimeSeriesOptions {
            line_width: 2,
            fill_opacity: 40,
            line_interpolation: Some(LineInterpolation::StepAfter),
            span_nulls: false,
            legend: Some(Legend::table(&["lastNotNull", "max", "mean"])),
            tooltip: Some(Tooltip::multi_descending()),
            ..TimeSeriesOptions::default()
        }))
    }
}

// Row: Konfiguration

/// Controller settings as (metric, entity, legend).
const CONFIG_SERIES: [(&str, &str, &str); 11] = [
    ("state_value", "fems81655_ctrlevcs0_chargemode", "Lademodus"),
    ("state_value", "fems81655_ctrlevcs0_priority", "Priorität"),
    ("state_state", "fems81655_ctrlevcs0_enabledcharging", "Laden aktiv"),
    ("state_state", "fems81655_ctrlemergencycapacityreserve0_isreservesocenabled", "Notreserve aktiv"),
    ("state_value", "fems81655_ctrlemergencycapacityreserve0_reservesoc", "Notreserve SoC"),
    ("state_value", "fems81655_ctrlgridoptimizedcharge0_mode", "Netzopt. Laden"),
    ("state_value", "fems81655_ctrlgridoptimizedcharge0_delaychargerisklevel", "Risiko Verzög."),
    ("state_value", "fems81655_ctrlioheatingelement0_mode", "Heizstab Modus"),
    ("state_value", "fems81655_ctrlioheatingelement0_workmode", "Heizstab Betrieb"),
    ("state_value", "fems81655_ctrlioheatingelement0_defaultlevel", "Heizstab Stufe"),
    ("state_state", "fems81655_meta_isesschargefromgridallowed", "Netzladung erlaubt"),
];

fn config_timeline() -> Panel {
    Panel {
        title: "Konfigurationsänderungen".to_string(),
        description: Some("Zeitliche Darstellung von Steuerungswert-Änderungen".to_string()),
        datasource: Some(datasource()),
        height: 8,
        span: 24,
        targets: CONFIG_SERIES
            .iter()
            .map(|(metric, entity, legend)| ha_query(selector(metric, entity), Some(*legend)))
            .collect(),
        ..Panel::new(PanelKind::StateTimeline(StateTimelineOptions {
            merge_values: true,
            row_height: 0.8,
            show_value: ValueVisibility::Auto,
            legend: Some(Legend::list()),
            tooltip: Some(Tooltip::single()),
        }))
    }
}

pub fn build() -> Dashboard {
    Dashboard {
        description: Some("FENECON FEMS Energiemanagement - WHS-11 Erlangen".to_string()),
        tags: ["fenecon", "energy", "solar", "battery", "whs-11"]
            .iter()
            .map(|t| t.to_string())
            .collect(),
        refresh: "30s".to_string(),
        time: TimeRange::new("now/d", "now/d"),
        variables: vec![datasource_variable()],
        ..Dashboard::new(UID, "FENECON Energiemonitor")
    }
    .with_row("Status")
    .with_panel(battery_soc_gauge())
    .with_panel(self_sufficiency_gauge())
    .with_panel(self_consumption_gauge())
    .with_row("Aktuelle Leistung")
    .with_panel(pv_power_stat())
    .with_panel(consumption_power_stat())
    .with_panel(grid_power_stat())
    .with_panel(battery_power_stat())
    .with_row("Energiemonitor")
    .with_panel(energy_monitor_chart())
    .with_row("Batterie")
    .with_panel(soc_timeline())
    .with_row("Energie Σ")
    .with_panel(production_energy_stat())
    .with_panel(consumption_energy_stat())
    .with_panel(grid_buy_energy_stat())
    .with_panel(grid_sell_energy_stat())
    .with_row("Speicher & PV-Strings")
    .with_panel(battery_charge_energy_stat())
    .with_panel(battery_discharge_energy_stat())
    .with_panel(mppt_stat(1, entity::MPPT1_POWER, colors::PV))
    .with_panel(mppt_stat(2, entity::MPPT2_POWER, colors::PV_LIGHT))
    .with_row("KEBA Wallbox")
    .with_panel(wallbox_power_stat())
    .with_panel(wallbox_session_energy_stat())
    .with_panel(wallbox_charging_chart())
    .with_row("Konfiguration")
    .with_panel(config_timeline())
}
