//! Authentication and authorization gate.
//!
//! Every request passes through [`AuthMiddleware`], which resolves the route's
//! [`RoutePolicy`] and asks the [`Gate`] for a decision:
//!
//! - **Public** routes skip credential extraction entirely.
//! - **Bearer/JWT token**: verified by a [`TokenVerifier`]; a token that fails
//!   verification falls back to the license check.
//! - **License key**: `x-licencia` header or `licencia` query parameter,
//!   checked against a [`LicenseRegistry`]. Licenses carry no role, so they
//!   never satisfy a role-restricted route.
//!
//! Granted requests carry an [`AuthDecision`] in their extensions, available
//! to handlers through [`RequestAuth`].

pub mod claims;
pub mod credentials;
pub mod decision;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod license;
pub mod middleware;
pub mod policy;
pub mod verifier;

pub use claims::Claims;
pub use decision::{AuthDecision, Identity, LicenseGrant};
pub use error::AuthError;
pub use gate::{authorize, Gate, GateOptions};
pub use jwt::JwtService;
pub use license::{LicenseRegistry, LicenseRegistryError, StaticLicenseRegistry};
pub use middleware::{AuthMiddleware, RequestAuth};
pub use policy::{PolicyRegistry, RoutePolicy};
pub use verifier::{TokenError, TokenVerifier};
