// Domain layer: request/response models and ports. No process or HTTP dependencies here.

pub mod model;
pub mod ports;
