mod acl;
mod cors;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use cors::{add_cors_headers, CorsMiddlewareFactory, CorsMiddlewareService, ALLOWED_HEADERS, ALLOWED_ORIGIN};
