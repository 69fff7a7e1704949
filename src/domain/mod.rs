// Domain layer: rule and slot models plus the ports the engine talks through.

pub mod model;
pub mod ports;
