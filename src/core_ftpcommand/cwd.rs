use crate::core_channel::{ChannelError, SessionChannel};
use crate::core_ftpcommand::utils::path_escape;

/// Handles the CWD FTP command.
///
/// Pure state bookkeeping: the pathname is taken as an absolute path the
/// backend previously produced for this session; whether it exists is the
/// backend's concern, not ours.
pub async fn handle_cwd_command(
    sc: &mut SessionChannel,
    pathname: &str,
) -> Result<(), ChannelError> {
    sc.session.current_dir = pathname.to_string();
    let response = format!(
        "250 CWD successful. \"{}\" is current directory",
        path_escape(pathname)
    );
    sc.channel.respond(&response).await
}
