pub mod aggregator;
pub mod error;
pub mod prompt;
pub mod sql;
pub mod ticker;
pub mod traits;
pub mod types;

pub use aggregator::aggregate_top_growth;
pub use error::*;
pub use prompt::{build_instruction, parse_completion};
pub use sql::QueryCatalog;
pub use traits::*;
pub use types::*;
