// Prints the FENECON energy monitor dashboard document
use ha_dashboards::application::catalog::DashboardKind;
use ha_dashboards::presentation::handlers::print_dashboard;

fn main() -> anyhow::Result<()> {
    print_dashboard(DashboardKind::FemsEnergy)
}
