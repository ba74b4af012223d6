//! Account directory adapters.
//!
//! - **OpenAccountDirectory** - Accepts every learner id (development)
//! - **InMemoryAccountDirectory** - Fixed set of known learners (testing)

mod in_memory;
mod open;

pub use in_memory::InMemoryAccountDirectory;
pub use open::OpenAccountDirectory;
