// Domain layer: core models and ports (interfaces) for price tracking.

pub mod model;
pub mod ports;
