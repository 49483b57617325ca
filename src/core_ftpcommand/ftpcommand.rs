/// Tiers a command may belong to, checked in dispatch order.
///
/// Lifecycle commands are always eligible; session commands need an
/// authorized session (PASS being the one that establishes it); data
/// commands additionally need a configured passive data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTier {
    Lifecycle,
    Session,
    Data,
}

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum FtpCommand {
    NOOP,
    QUIT,
    USER,
    AUTH,
    SYST,
    FEAT,
    PBSZ,
    PROT,
    OPTS,
    TYPE,
    PASS,
    PWD,
    PASV,
    EPSV,
    CWD,
    CDUP,
    MKD,
    MDTM,
    STAT,
    LIST,
    NLST,
    STOR,
    RETR,
    APPE,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "NOOP" => Some(FtpCommand::NOOP),
            "QUIT" => Some(FtpCommand::QUIT),
            "USER" => Some(FtpCommand::USER),
            "AUTH" => Some(FtpCommand::AUTH),
            "SYST" => Some(FtpCommand::SYST),
            "FEAT" => Some(FtpCommand::FEAT),
            "PBSZ" => Some(FtpCommand::PBSZ),
            "PROT" => Some(FtpCommand::PROT),
            "OPTS" => Some(FtpCommand::OPTS),
            "TYPE" => Some(FtpCommand::TYPE),
            "PASS" => Some(FtpCommand::PASS),
            "PWD" => Some(FtpCommand::PWD),
            "PASV" => Some(FtpCommand::PASV),
            "EPSV" => Some(FtpCommand::EPSV),
            "CWD" => Some(FtpCommand::CWD),
            "CDUP" => Some(FtpCommand::CDUP),
            "MKD" => Some(FtpCommand::MKD),
            "MDTM" => Some(FtpCommand::MDTM),
            "STAT" => Some(FtpCommand::STAT),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "STOR" => Some(FtpCommand::STOR),
            "RETR" => Some(FtpCommand::RETR),
            "APPE" => Some(FtpCommand::APPE),
            _ => None,
        }
    }

    pub fn tier(&self) -> CommandTier {
        match self {
            FtpCommand::NOOP
            | FtpCommand::QUIT
            | FtpCommand::USER
            | FtpCommand::AUTH
            | FtpCommand::SYST
            | FtpCommand::FEAT
            | FtpCommand::PBSZ
            | FtpCommand::PROT
            | FtpCommand::OPTS
            | FtpCommand::TYPE => CommandTier::Lifecycle,
            FtpCommand::PASS
            | FtpCommand::PWD
            | FtpCommand::PASV
            | FtpCommand::EPSV
            | FtpCommand::CWD
            | FtpCommand::CDUP
            | FtpCommand::MKD
            | FtpCommand::MDTM
            | FtpCommand::STAT => CommandTier::Session,
            FtpCommand::LIST
            | FtpCommand::NLST
            | FtpCommand::STOR
            | FtpCommand::RETR
            | FtpCommand::APPE => CommandTier::Data,
        }
    }
}
