pub mod model;
pub mod server;

pub use model::TickSnapshot;
pub use server::Bridge;
