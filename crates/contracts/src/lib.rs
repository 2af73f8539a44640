//! Contract interfaces and deployment addresses of the Balancer protocol
//! entry points used to manage pool liquidity.

pub mod alloy;
pub mod deployments;
