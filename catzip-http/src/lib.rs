pub mod disposition;
pub mod error;
pub mod routes;
pub mod stream;

pub use routes::router;
