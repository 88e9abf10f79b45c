// Domain layer - Dashboard document model
pub mod dashboard;
pub mod layout;
pub mod link;
pub mod panel;
pub mod query;
pub mod threshold;
