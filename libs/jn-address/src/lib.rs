//! Lexes a single address descriptor (`base['~'format_override]['?'query]`)
//! into a structured, immutable [`Address`] record. Parsing never fails;
//! ill-formed input degrades to `Kind::File` or `Kind::BareAddress`.

mod address;
mod grammar;
mod kind;

pub use address::{parse, reconstruct, Address, Parameters};
pub use kind::Kind;
