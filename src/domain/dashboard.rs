// Dashboard domain model
use super::link::DataLink;
use super::panel::Panel;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use thiserror::Error;

/// `${name}` / `${name:format}`, `[[name]]` / `[[name:format]]` and `$name`.
static VARIABLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(\w+)(?::[^}]*)?\}|\[\[(\w+)(?::[^\]]*)?\]\]|\$(\w+)")
        .expect("variable reference pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl TimeRange {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableHide {
    Shown,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKind {
    /// Picks a data source of the given plugin type.
    Datasource { plugin: String },
    /// Free text, usually supplied through `var-<name>` URL parameters.
    TextBox { default: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub label: String,
    pub hide: VariableHide,
    pub kind: VariableKind,
}

impl Variable {
    /// Hidden text box, filled in by drilldown links.
    pub fn hidden_text(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            hide: VariableHide::Hidden,
            kind: VariableKind::TextBox {
                default: String::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardItem {
    Row(String),
    Panel(Panel),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub uid: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub editable: bool,
    pub timezone: String,
    pub refresh: String,
    pub time: TimeRange,
    pub variables: Vec<Variable>,
    pub links: Vec<DataLink>,
    pub items: Vec<DashboardItem>,
}

#[derive(Debug, Error, PartialEq)]
pub enum DashboardError {
    #[error("dashboard {uid} references undeclared variables: {names:?}")]
    UndeclaredVariables { uid: String, names: Vec<String> },
    #[error("panel '{panel}' has thresholds that are not in ascending order")]
    ThresholdOrder { panel: String },
    #[error("panel '{panel}' has a data link but no query")]
    LinkWithoutQuery { panel: String },
    #[error("panel '{panel}' spans {span} columns, expected 1..=24")]
    Span { panel: String, span: u32 },
}

impl Dashboard {
    pub fn new(uid: &str, title: &str) -> Self {
        Self {
            uid: uid.to_string(),
            title: title.to_string(),
            description: None,
            tags: Vec::new(),
            editable: true,
            timezone: "browser".to_string(),
            refresh: String::new(),
            time: TimeRange::new("now-6h", "now"),
            variables: Vec::new(),
            links: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn with_row(mut self, title: &str) -> Self {
        self.items.push(DashboardItem::Row(title.to_string()));
        self
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.items.push(DashboardItem::Panel(panel));
        self
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.items.iter().filter_map(|item| match item {
            DashboardItem::Panel(panel) => Some(panel),
            DashboardItem::Row(_) => None,
        })
    }

    /// Names referenced from panel titles, queries, datasources and link URLs that are not declared.
    pub fn undeclared_variables(&self) -> Vec<String> {
        let declared: BTreeSet<&str> = self.variables.iter().map(|v| v.name.as_str()).collect();

        let mut texts: Vec<&str> = Vec::new();
        for panel in self.panels() {
            texts.push(&panel.title);
            if let Some(description) = &panel.description {
                texts.push(description);
            }
            if let Some(ds) = &panel.datasource {
                texts.push(&ds.uid);
            }
            for target in &panel.targets {
                texts.push(&target.datasource.uid);
                texts.push(&target.expr);
                if let Some(legend) = &target.legend {
                    texts.push(legend);
                }
            }
            texts.extend(panel.links.iter().map(|l| l.url.as_str()));
        }
        texts.extend(self.links.iter().map(|l| l.url.as_str()));

        let missing: BTreeSet<String> = texts
            .into_iter()
            .flat_map(referenced_variables)
            .filter(|name| !name.starts_with("__") && !declared.contains(name.as_str()))
            .collect();
        missing.into_iter().collect()
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        let names = self.undeclared_variables();
        if !names.is_empty() {
            return Err(DashboardError::UndeclaredVariables {
                uid: self.uid.clone(),
                names,
            });
        }

        for panel in self.panels() {
            if !(1..=super::layout::GRID_WIDTH).contains(&panel.span) {
                return Err(DashboardError::Span {
                    panel: panel.title.clone(),
                    span: panel.span,
                });
            }
            if let Some(thresholds) = &panel.thresholds {
                if !thresholds.is_well_ordered() {
                    return Err(DashboardError::ThresholdOrder {
                        panel: panel.title.clone(),
                    });
                }
            }
            if !panel.links.is_empty() && panel.targets.is_empty() {
                return Err(DashboardError::LinkWithoutQuery {
                    panel: panel.title.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Variable names used in `text` through `$name`, `${name}` or `[[name]]`.
pub fn referenced_variables(text: &str) -> Vec<String> {
    VARIABLE_REFERENCE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|name| name.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::link::DataLink;
    use crate::domain::query::{DatasourceRef, Query};
    use crate::domain::threshold::{ThresholdStep, Thresholds};

    fn datasource() -> DatasourceRef {
        DatasourceRef {
            kind: "prometheus".to_string(),
            uid: "$datasource".to_string(),
        }
    }

    fn datasource_variable() -> Variable {
        Variable {
            name: "datasource".to_string(),
            label: "Data source".to_string(),
            hide: VariableHide::Shown,
            kind: VariableKind::Datasource {
                plugin: "prometheus".to_string(),
            },
        }
    }

    #[test]
    fn test_referenced_variables() {
        let expr = r#"increase({__name__="$metric", entity_id="${entity}"}[$__interval]) [[unit:raw]]"#;
        assert_eq!(
            referenced_variables(expr),
            vec!["metric", "entity", "__interval", "unit"]
        );
        assert!(referenced_variables("clamp_min(x[5m], 0) $ 1").is_empty());
        assert_eq!(referenced_variables("${title:raw} ${broken"), vec!["title"]);
    }

    #[test]
    fn test_panel_title_and_description_are_scanned() {
        let panel = Panel {
            title: "$missing".to_string(),
            description: Some("Series of ${entity}".to_string()),
            targets: vec![Query::new(datasource(), "up")],
            ..Panel::time_series()
        };
        let mut dashboard = Dashboard::new("detail", "Detail").with_panel(panel);
        dashboard.variables.push(datasource_variable());

        assert_eq!(dashboard.undeclared_variables(), vec!["entity", "missing"]);
        assert!(matches!(
            dashboard.validate(),
            Err(DashboardError::UndeclaredVariables { .. })
        ));
    }

    #[test]
    fn test_undeclared_variables() {
        let panel = Panel {
            title: "Detail".to_string(),
            targets: vec![
                Query::new(datasource(), r#"{__name__="$metric", entity_id="$entity"}"#)
                    .with_legend("$title"),
            ],
            ..Panel::time_series()
        };
        let mut dashboard = Dashboard::new("detail", "Detail").with_panel(panel);
        dashboard.variables.push(datasource_variable());
        dashboard.variables.push(Variable::hidden_text("metric", "Metric"));

        assert_eq!(dashboard.undeclared_variables(), vec!["entity", "title"]);

        dashboard.variables.push(Variable::hidden_text("entity", "Entity"));
        dashboard.variables.push(Variable::hidden_text("title", "Title"));
        assert!(dashboard.undeclared_variables().is_empty());
        assert_eq!(dashboard.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_link_without_query() {
        let panel = Panel {
            title: "Orphan".to_string(),
            links: vec![DataLink::new("Detailansicht", "/d/somewhere".to_string())],
            ..Panel::stat()
        };
        let dashboard = Dashboard::new("x", "X").with_panel(panel);

        assert_eq!(
            dashboard.validate(),
            Err(DashboardError::LinkWithoutQuery {
                panel: "Orphan".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let panel = Panel {
            title: "Bad ramp".to_string(),
            thresholds: Some(Thresholds::absolute(vec![
                ThresholdStep::base("red"),
                ThresholdStep::at(50.0, "green"),
                ThresholdStep::at(10.0, "orange"),
            ])),
            ..Panel::gauge()
        };
        let dashboard = Dashboard::new("x", "X").with_panel(panel);

        assert!(matches!(
            dashboard.validate(),
            Err(DashboardError::ThresholdOrder { .. })
        ));
    }
}
