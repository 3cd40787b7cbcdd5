pub mod gate;
pub mod handlers;
pub mod policy;
pub mod router;
