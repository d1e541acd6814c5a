pub mod connection;
pub mod schema;
pub mod queries;
pub mod session;

pub use connection::*;
pub use schema::*;
pub use queries::*;
pub use session::*;
