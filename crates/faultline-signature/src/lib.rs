pub mod parse;
pub mod signature;

pub use parse::{parse_signature, SignatureParseError};
pub use signature::MethodSignature;
