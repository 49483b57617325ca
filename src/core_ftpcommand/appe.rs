use crate::core_channel::{ChannelError, SessionChannel};

pub async fn handle_appe_command(sc: &mut SessionChannel) -> Result<(), ChannelError> {
    sc.channel.respond("502 APPE not implemented.").await
}
