use crate::core_channel::{ChannelError, SessionChannel};

/// Name-only listings are not offered; clients use LIST.
pub async fn handle_nlst_command(sc: &mut SessionChannel) -> Result<(), ChannelError> {
    sc.channel.respond("502 Not Supported").await
}
