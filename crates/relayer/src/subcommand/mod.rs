pub mod check;
pub mod init_committee;
