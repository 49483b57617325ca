pub mod ftpcommand;
pub mod handlers;
pub mod utils;

pub mod appe;
pub mod auth;
pub mod cdup;
pub mod cwd;
pub mod epsv;
pub mod feat;
pub mod list;
pub mod mdtm;
pub mod mkd;
pub mod noop;
pub mod opts;
pub mod pass;
pub mod pasv;
pub mod pbsz;
pub mod prot;
pub mod pwd;
pub mod quit;
pub mod retr;
pub mod stat;
pub mod stor;
pub mod syst;
pub mod type_;
pub mod user;
pub mod nlst;
