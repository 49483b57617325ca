use crate::core_channel::{ChannelError, ControlChannel};

pub async fn handle_noop_command(channel: &mut ControlChannel) -> Result<(), ChannelError> {
    channel.respond("200 OK").await
}
