//! Inbound webhook handling: signature verification, parsing and routing

pub mod parser;
pub mod router;
pub mod signature;

pub use parser::parse_event;
pub use router::{categorize, categorize_type, EventCategory, LiveStreamEvent};
pub use signature::{sign, SignatureVerifier, BYPASS_HEADER, SIGNATURE_HEADER};
