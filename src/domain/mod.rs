// Domain layer: sensor layout, tables and ports. No plotting or filesystem code here.

pub mod layout;
pub mod model;
pub mod ports;
