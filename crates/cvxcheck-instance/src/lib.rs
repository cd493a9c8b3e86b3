mod random;
mod data;
mod dimensions;
mod instance;

pub use random::RandomSource;
pub use data::{
    linear_data, mpc_data, portfolio_data, LinearData, MpcData, PortfolioData, ReturnVector,
    LINEAR_REFERENCE_VALUE,
};
pub use dimensions::Dimensions;
pub use instance::{build_instance, ProblemInstance, SocBlock};

#[cfg(test)]
mod tests;
