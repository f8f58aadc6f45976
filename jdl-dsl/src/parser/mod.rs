//! Parser module for JDL

pub mod cst;
pub mod error;
pub mod grammar;
pub mod rule;

pub use cst::*;
pub use error::*;
pub use grammar::*;
pub use rule::*;
