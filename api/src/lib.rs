// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup
// - infrastructure: Postgres adapters
// - presentation: HTTP handlers and routing
// - application: ports, use cases and the link-aware text scanning services
// - domain: core models

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
