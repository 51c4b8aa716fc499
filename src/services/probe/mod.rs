pub mod policy;
pub mod runner;

pub use policy::RetryPolicy;
pub use runner::{ProbeError, run};
