//! Authentication: JWT issuance, device fingerprints, and extractors.

pub mod extract;
pub mod fingerprint;
pub mod tokens;

pub use extract::AuthUser;
pub use fingerprint::device_fingerprint;
pub use tokens::{Claims, TokenIssuer, TokenPair};
