// Domain layer: account model and ports. No I/O lives here.

pub mod model;
pub mod ports;
