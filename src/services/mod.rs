pub mod authorization;
pub mod identity;
pub mod message;
pub mod projection;
