//! In-memory engagement adapters.

mod engagement;

pub use engagement::InMemoryEngagementRepository;
