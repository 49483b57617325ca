use crate::core_channel::{ChannelError, ControlChannel};

/// Tells the client what kind of operating system it is talking to.
pub async fn handle_syst_command(channel: &mut ControlChannel) -> Result<(), ChannelError> {
    channel.respond("215 UNIX Type: I").await
}
