pub mod auth;
pub mod events;
pub mod models;
pub mod mt5;
pub mod traits;

pub use auth::*;
pub use events::*;
pub use models::*;
pub use mt5::*;
pub use traits::*;
