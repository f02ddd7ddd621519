// Domain layer: answers, records, view models and ports. No I/O here.

pub mod model;
pub mod ports;
pub mod questionnaire;
pub mod view;
