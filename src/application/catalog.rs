// Registry of the generated dashboards
use crate::application::{fems_detail, fems_energy, vw_id7, vw_id7_detail};
use crate::domain::dashboard::Dashboard;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardKind {
    FemsEnergy,
    FemsDetail,
    VwId7,
    VwId7Detail,
}

impl DashboardKind {
    pub const ALL: [DashboardKind; 4] = [
        DashboardKind::FemsEnergy,
        DashboardKind::FemsDetail,
        DashboardKind::VwId7,
        DashboardKind::VwId7Detail,
    ];

    /// File stem and command-line name.
    pub fn name(self) -> &'static str {
        match self {
            DashboardKind::FemsEnergy => "fems-energy",
            DashboardKind::FemsDetail => "fems-detail",
            DashboardKind::VwId7 => "vw-id7",
            DashboardKind::VwId7Detail => "vw-id7-detail",
        }
    }

    pub fn uid(self) -> &'static str {
        match self {
            DashboardKind::FemsEnergy => fems_energy::UID,
            DashboardKind::FemsDetail => fems_detail::UID,
            DashboardKind::VwId7 => vw_id7::UID,
            DashboardKind::VwId7Detail => vw_id7_detail::UID,
        }
    }

    pub fn build(self) -> Dashboard {
        match self {
            DashboardKind::FemsEnergy => fems_energy::build(),
            DashboardKind::FemsDetail => fems_detail::build(),
            DashboardKind::VwId7 => vw_id7::build(),
            DashboardKind::VwId7Detail => vw_id7_detail::build(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_uid(uid: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.uid() == uid)
    }
}

impl fmt::Display for DashboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DashboardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|k| k.name()).collect();
                format!("unknown dashboard '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::{DashboardItem, referenced_variables};
    use crate::domain::panel::{Matcher, PanelKind};
    use crate::infrastructure::url_encoding::query_pairs;

    #[test]
    fn test_names_round_trip() {
        for kind in DashboardKind::ALL {
            assert_eq!(kind.name().parse::<DashboardKind>(), Ok(kind));
            assert_eq!(kind.build().uid, kind.uid());
            assert_eq!(DashboardKind::from_uid(kind.uid()), Some(kind));
        }
        assert!("grafana".parse::<DashboardKind>().is_err());
    }

    #[test]
    fn test_every_dashboard_validates() {
        for kind in DashboardKind::ALL {
            let dashboard = kind.build();
            assert!(dashboard.undeclared_variables().is_empty(), "{}", kind);
            assert_eq!(dashboard.validate(), Ok(()), "{}", kind);
        }
    }

    #[test]
    fn test_drilldown_parameters_exist_on_target() {
        for kind in DashboardKind::ALL {
            for panel in kind.build().panels() {
                for link in &panel.links {
                    let target_uid = link
                        .url
                        .strip_prefix("/d/")
                        .and_then(|rest| rest.split('?').next())
                        .unwrap_or_default();
                    let target = DashboardKind::from_uid(target_uid)
                        .unwrap_or_else(|| panic!("{} links to unknown {}", panel.title, target_uid))
                        .build();

                    for (name, _) in query_pairs(&link.url) {
                        let variable = name.strip_prefix("var-").expect("var- prefix");
                        assert!(
                            target.variables.iter().any(|v| v.name == variable),
                            "{} passes {} which {} does not declare",
                            panel.title,
                            variable,
                            target.uid
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_detail_variables_are_used() {
        for kind in [DashboardKind::FemsDetail, DashboardKind::VwId7Detail] {
            let dashboard = kind.build();
            let used: Vec<String> = dashboard
                .panels()
                .flat_map(|p| p.targets.iter())
                .flat_map(|t| {
                    let mut names = referenced_variables(&t.expr);
                    names.extend(t.legend.as_deref().map(referenced_variables).unwrap_or_default());
                    names
                })
                .collect();

            for variable in &dashboard.variables {
                // unit is informational only
                if variable.name == "unit" || variable.name == "datasource" {
                    continue;
                }
                assert!(used.contains(&variable.name), "{} never uses ${}", kind, variable.name);
            }
        }
    }

    #[test]
    fn test_linked_panels_have_queries() {
        for kind in DashboardKind::ALL {
            for panel in kind.build().panels() {
                if !panel.links.is_empty() {
                    assert!(!panel.targets.is_empty(), "{}", panel.title);
                }
            }
        }
    }

    #[test]
    fn test_named_colours_cover_every_series() {
        for kind in DashboardKind::ALL {
            for panel in kind.build().panels() {
                let by_name = panel.overrides.iter().any(|o| matches!(o.matcher, Matcher::ByName(_)));
                if panel.kind.is_chart() && by_name && panel.targets.len() > 1 {
                    for index in 0..panel.targets.len() {
                        assert!(panel.has_override_for(index), "{} series {}", panel.title, index);
                    }
                }
            }
        }
    }

    #[test]
    fn test_percent_panels_fix_axis() {
        for kind in DashboardKind::ALL {
            for panel in kind.build().panels() {
                if panel.unit.as_deref() == Some("percent") && !matches!(panel.kind, PanelKind::Stat(_)) {
                    assert_eq!(panel.min, Some(0.0), "{}", panel.title);
                    assert_eq!(panel.max, Some(100.0), "{}", panel.title);
                }
            }
        }
    }

    #[test]
    fn test_rows_only_on_energy_monitor() {
        for kind in DashboardKind::ALL {
            let rows = kind
                .build()
                .items
                .iter()
                .filter(|item| matches!(item, DashboardItem::Row(_)))
                .count();
            let expected = if kind == DashboardKind::FemsEnergy { 8 } else { 0 };
            assert_eq!(rows, expected, "{}", kind);
        }
    }
}
