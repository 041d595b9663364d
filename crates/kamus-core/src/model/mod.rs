mod message;
mod session;


pub use message::*;
pub use session::*;
