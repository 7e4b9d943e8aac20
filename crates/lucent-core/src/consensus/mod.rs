pub mod bootstrap;
pub mod checkpoint;
pub mod fork;
pub mod light_client;
pub mod merkle;
pub mod period;
pub mod store;
pub mod sync_committee;
pub mod validation;

pub use bootstrap::*;
pub use checkpoint::*;
pub use fork::*;
pub use light_client::*;
pub use merkle::*;
pub use period::*;
pub use store::*;
pub use sync_committee::*;
pub use validation::*;
