// Auto-fit layout: keeps a résumé on exactly one A4 page.
// The engine is a pure state machine; measurement comes from the browser (via the
// measure endpoint) or from the server-side estimator.

pub mod engine;
pub mod fit;
pub mod measure;
pub mod metrics;
pub mod tokens;
