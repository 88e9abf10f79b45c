// Grafana dashboard generator for the Home Assistant Prometheus metrics
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
