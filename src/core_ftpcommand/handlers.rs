use std::sync::Arc;

use crate::core_channel::{ChannelError, ControlChannel, SessionChannel};
use crate::core_ftpcommand::ftpcommand::{CommandTier, FtpCommand};
use crate::core_ftpcommand::utils::parse_command_line;
use crate::core_ftpcommand::*;
use crate::core_registry::EndpointHandlers;
use crate::server::ServerContext;

/// Runs one inbound line through the three-tier state machine and returns
/// the channel all subsequent lines must go through.
///
/// Precedence, each step short-circuiting on a reply:
/// 1. lifecycle commands, always eligible;
/// 2. the TLS-only gate;
/// 3. unknown verbs;
/// 4. the session gate (PASS exempted, it establishes authorization);
/// 5. the data-channel gate;
/// 6. handler invocation.
///
/// Whatever branch ran, the dispatched verb is committed as
/// `previous_command` on the resulting channel before the next line is
/// processed. Only transport and handshake failures escape as errors.
pub async fn dispatch_command(
    channel: ControlChannel,
    context: &Arc<ServerContext>,
    registry: &Arc<dyn EndpointHandlers>,
    line: &str,
) -> Result<ControlChannel, ChannelError> {
    let (verb, arg) = parse_command_line(line);
    let command = FtpCommand::from_str(&verb);

    let mut channel = match command {
        Some(cmd) if cmd.tier() == CommandTier::Lifecycle => {
            dispatch_lifecycle(cmd, channel, context, registry, &arg).await?
        }
        _ => {
            let mut channel = channel;
            dispatch_gated(command, &mut channel, context, registry, &verb, &arg).await?;
            channel
        }
    };
    channel.set_previous_command(&verb);
    Ok(channel)
}

async fn dispatch_lifecycle(
    cmd: FtpCommand,
    mut channel: ControlChannel,
    context: &Arc<ServerContext>,
    registry: &Arc<dyn EndpointHandlers>,
    arg: &str,
) -> Result<ControlChannel, ChannelError> {
    match cmd {
        FtpCommand::USER => return user::handle_user_command(channel, context, registry, arg).await,
        FtpCommand::AUTH => return auth::handle_auth_command(channel, context, arg).await,
        FtpCommand::NOOP => noop::handle_noop_command(&mut channel).await?,
        FtpCommand::QUIT => quit::handle_quit_command(&mut channel).await?,
        FtpCommand::SYST => syst::handle_syst_command(&mut channel).await?,
        FtpCommand::FEAT => feat::handle_feat_command(&mut channel, context).await?,
        FtpCommand::PBSZ => pbsz::handle_pbsz_command(&mut channel, context, arg).await?,
        FtpCommand::PROT => prot::handle_prot_command(&mut channel, context, arg).await?,
        FtpCommand::OPTS => opts::handle_opts_command(&mut channel, arg).await?,
        FtpCommand::TYPE => type_::handle_type_command(&mut channel, arg).await?,
        _ => {}
    }
    Ok(channel)
}

async fn dispatch_gated(
    command: Option<FtpCommand>,
    channel: &mut ControlChannel,
    context: &Arc<ServerContext>,
    registry: &Arc<dyn EndpointHandlers>,
    verb: &str,
    arg: &str,
) -> Result<(), ChannelError> {
    // With `tls_only` set, everything outside the lifecycle tier is refused
    // until the channel has been upgraded. See RFC 4217 for the reply code.
    if context.is_tls_only && !channel.is_secure() {
        return channel
            .respond("522 Protection level not sufficient; send AUTH TLS")
            .await;
    }
    let Some(cmd) = command else {
        return channel.respond(&format!("502 {} not implemented.", verb)).await;
    };
    match channel.session_channel_mut() {
        None => channel.respond("530 Not logged in.").await,
        Some(sc) if !sc.session.is_authorized && cmd != FtpCommand::PASS => {
            sc.channel.respond("530 Not logged in.").await
        }
        Some(sc) => match cmd.tier() {
            CommandTier::Session => dispatch_session(cmd, sc, context, registry, arg).await,
            CommandTier::Data => {
                if !sc.session.is_pasv_configured() {
                    sc.channel
                        .respond("425 Data connection not configured; send PASV or PORT")
                        .await
                } else {
                    dispatch_data(cmd, sc, context, registry, arg).await
                }
            }
            // Lifecycle commands never reach the gated path.
            CommandTier::Lifecycle => Ok(()),
        },
    }
}

async fn dispatch_session(
    cmd: FtpCommand,
    sc: &mut SessionChannel,
    context: &Arc<ServerContext>,
    registry: &Arc<dyn EndpointHandlers>,
    arg: &str,
) -> Result<(), ChannelError> {
    match cmd {
        FtpCommand::PASS => pass::handle_pass_command(sc, arg).await,
        FtpCommand::PWD => pwd::handle_pwd_command(sc, arg).await,
        FtpCommand::PASV => pasv::handle_pasv_command(sc, context).await,
        FtpCommand::EPSV => epsv::handle_epsv_command(sc).await,
        FtpCommand::CWD => cwd::handle_cwd_command(sc, arg).await,
        FtpCommand::CDUP => cdup::handle_cdup_command(sc).await,
        FtpCommand::MKD => mkd::handle_mkd_command(sc, arg).await,
        FtpCommand::MDTM => mdtm::handle_mdtm_command(sc, registry, arg).await,
        FtpCommand::STAT => stat::handle_stat_command(sc).await,
        _ => Ok(()),
    }
}

async fn dispatch_data(
    cmd: FtpCommand,
    sc: &mut SessionChannel,
    _context: &Arc<ServerContext>,
    registry: &Arc<dyn EndpointHandlers>,
    arg: &str,
) -> Result<(), ChannelError> {
    match cmd {
        FtpCommand::LIST => list::handle_list_command(sc, registry, arg).await,
        FtpCommand::NLST => nlst::handle_nlst_command(sc).await,
        FtpCommand::STOR => stor::handle_stor_command(sc, arg).await,
        FtpCommand::RETR => retr::handle_retr_command(sc, arg).await,
        FtpCommand::APPE => appe::handle_appe_command(sc).await,
        _ => Ok(()),
    }
}
