pub mod average;
pub mod convert;
pub mod grade;
pub mod init;
pub mod validate;
