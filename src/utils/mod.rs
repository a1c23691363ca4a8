pub mod html;
pub mod jwt;
pub mod password;
