// Prints the FENECON drilldown dashboard document
use ha_dashboards::application::catalog::DashboardKind;
use ha_dashboards::presentation::handlers::print_dashboard;

fn main() -> anyhow::Result<()> {
    print_dashboard(DashboardKind::FemsDetail)
}
