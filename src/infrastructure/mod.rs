// Infrastructure layer - JSON mapping, link encoding, settings and output
pub mod config;
pub mod emitter;
pub mod grafana_mapper;
pub mod url_encoding;
