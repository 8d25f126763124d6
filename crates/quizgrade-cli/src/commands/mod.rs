pub mod grade;
pub mod init;
pub mod normalize;
pub mod validate;
