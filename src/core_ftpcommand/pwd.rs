use crate::core_channel::{ChannelError, SessionChannel};
use crate::core_ftpcommand::utils::path_escape;

/// PWD takes no argument; anything else is a syntax error.
pub async fn handle_pwd_command(
    sc: &mut SessionChannel,
    unexpected_arg: &str,
) -> Result<(), ChannelError> {
    if unexpected_arg.is_empty() {
        let response = format!(
            "257 \"{}\" is current directory",
            path_escape(&sc.session.current_dir)
        );
        sc.channel.respond(&response).await
    } else {
        sc.channel
            .respond("501 Syntax error in parameters or arguments.")
            .await
    }
}
