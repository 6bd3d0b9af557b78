//! Record model returned by retrieval

mod record;
mod value;

pub use record::*;
pub use value::*;
