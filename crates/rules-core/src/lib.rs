pub mod compiler;
pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod paths;
pub mod questionnaire;
pub mod questions;
pub mod registry;
pub mod skills;
pub mod types;
pub mod writer;

pub use error::{Result, RulesError};
