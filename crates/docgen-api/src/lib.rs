pub mod documents;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use documents::*;
pub use error::*;
pub use routes::*;
pub use server::*;
pub use state::*;
