// Application layer - Dashboard builders and shared helpers
pub mod catalog;
pub mod fems_detail;
pub mod fems_energy;
pub mod promql;
pub mod shared;
pub mod vw_id7;
pub mod vw_id7_detail;
