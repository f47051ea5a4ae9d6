pub mod gmail;
pub mod parser;

pub use gmail::GmailClient;
pub use parser::ParsedEmail;
