mod host_auth;

pub use host_auth::*;
