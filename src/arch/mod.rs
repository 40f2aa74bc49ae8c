mod builder;
mod layer;
mod network;
mod sigmoid;
mod split;
mod unit;

pub use builder::NetworkBuilder;
pub use layer::Layer;
pub use network::Network;
pub use sigmoid::Sigmoid;
pub use split::{Split, Splits};
pub use unit::Unit;
