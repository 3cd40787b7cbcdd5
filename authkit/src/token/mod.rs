pub mod claims;
pub mod errors;
pub mod service;

pub use claims::Claims;
pub use errors::TokenError;
pub use errors::TokenRejection;
pub use service::Identity;
pub use service::TokenService;
