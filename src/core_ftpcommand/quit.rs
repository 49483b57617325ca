use crate::core_channel::{ChannelError, ControlChannel};
use log::info;

/// Handles the QUIT FTP command: say goodbye, then close the control
/// channel. The dispatcher loop sees the closed channel and ends the task.
pub async fn handle_quit_command(channel: &mut ControlChannel) -> Result<(), ChannelError> {
    info!("Received QUIT command. Closing connection.");
    channel.respond("221 Goodbye").await?;
    channel.close().await;
    Ok(())
}
