pub mod channel;
pub mod error;
pub mod session_channel;

pub use channel::Channel;
pub use error::ChannelError;
pub use session_channel::{ControlChannel, SessionChannel};
