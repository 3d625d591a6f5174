pub mod answer;
pub mod question;
pub mod share;
pub mod test;
pub mod user;
