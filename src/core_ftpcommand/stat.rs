use crate::core_channel::{ChannelError, SessionChannel};

pub async fn handle_stat_command(sc: &mut SessionChannel) -> Result<(), ChannelError> {
    sc.channel.respond("502 Not Supported").await
}
