pub mod csp;
pub mod extensions;

pub use csp::{csp_middleware, CspMiddleware, CspMiddlewareService};
pub use extensions::CspExtensions;
