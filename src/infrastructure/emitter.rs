// Turns dashboards into provisioning documents on stdout or disk
use crate::application::catalog::DashboardKind;
use crate::domain::dashboard::{Dashboard, DashboardError};
use crate::infrastructure::grafana_mapper::dashboard_to_json;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Invalid(#[from] DashboardError),
    #[error("failed to serialize dashboard: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validate and serialize one dashboard as `{"dashboard": …, "overwrite": true}`.
pub fn render(dashboard: &Dashboard, pretty: bool) -> Result<String, GenerateError> {
    dashboard.validate()?;

    let document = json!({
        "dashboard": dashboard_to_json(dashboard),
        "overwrite": true,
    });
    let mut text = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    text.push('\n');

    debug!(uid = %dashboard.uid, bytes = text.len(), "rendered dashboard");
    Ok(text)
}

pub fn write_stdout(kind: DashboardKind, pretty: bool) -> Result<(), GenerateError> {
    let text = render(&kind.build(), pretty)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|source| GenerateError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })
}

/// Write every dashboard to `<dir>/<name>.json`, returning the written paths.
pub fn write_all(dir: &Path, pretty: bool) -> Result<Vec<PathBuf>, GenerateError> {
    std::fs::create_dir_all(dir).map_err(|source| GenerateError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(DashboardKind::ALL.len());
    for kind in DashboardKind::ALL {
        let text = render(&kind.build(), pretty)?;
        let path = dir.join(format!("{}.json", kind.name()));
        std::fs::write(&path, text).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        info!(dashboard = %kind, path = %path.display(), "wrote dashboard");
        written.push(path);
    }
    Ok(written)
}

/// Validate every dashboard, collecting all problems instead of stopping at the first.
pub fn check_all() -> Vec<(DashboardKind, DashboardError)> {
    DashboardKind::ALL
        .into_iter()
        .filter_map(|kind| kind.build().validate().err().map(|err| (kind, err)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::panel::Panel;
    use crate::domain::query::DatasourceRef;

    #[test]
    fn test_render_is_deterministic() {
        for kind in DashboardKind::ALL {
            let first = render(&kind.build(), true).unwrap();
            let second = render(&kind.build(), true).unwrap();
            assert_eq!(first, second, "{}", kind);
        }
    }

    #[test]
    fn test_document_wrapper() {
        let text = render(&DashboardKind::FemsDetail.build(), false).unwrap();
        let document: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(document["overwrite"], true);
        assert_eq!(document["dashboard"]["uid"], "fems-detail-whs11");
        assert!(text.ends_with("}\n"));
        assert!(!text.contains("\n  "));
    }

    #[test]
    fn test_undeclared_variable_fails() {
        let dashboard = Dashboard::new("broken", "Broken").with_panel(Panel {
            title: "Orphan".to_string(),
            datasource: Some(DatasourceRef {
                kind: "prometheus".to_string(),
                uid: "$datasource".to_string(),
            }),
            ..Panel::stat()
        });

        match render(&dashboard, true) {
            Err(GenerateError::Invalid(DashboardError::UndeclaredVariables { names, .. })) => {
                assert_eq!(names, vec!["datasource".to_string()]);
            }
            other => panic!("expected undeclared variable error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_all_and_check_all() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dist");

        let written = write_all(&out, true).unwrap();
        assert_eq!(written.len(), 4);
        assert!(out.join("vw-id7-detail.json").exists());

        let text = std::fs::read_to_string(out.join("fems-energy.json")).unwrap();
        assert_eq!(text, render(&DashboardKind::FemsEnergy.build(), true).unwrap());

        assert!(check_all().is_empty());
    }

    #[test]
    fn test_write_all_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        match write_all(&blocker, true) {
            Err(GenerateError::Io { path, .. }) => assert_eq!(path, blocker),
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }
}
