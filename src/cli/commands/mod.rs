pub mod edit;
pub mod init;
pub mod show;
pub mod transfer;
