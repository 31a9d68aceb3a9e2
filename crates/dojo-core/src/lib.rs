//! The training loop and its supporting machinery: scenario generation,
//! the arena, the fitness evaluator, the mutator, the monoculture
//! sentinel, and the evolution controller that ties them together.

pub mod arena;
pub mod backend;
pub mod config;
pub mod evolution;
pub mod fitness;
pub mod guardian;
pub mod lineage;
pub mod mutator;
pub mod oracles;
pub mod scenarios;
pub mod sentinel;
pub mod store;

pub use backend::HttpChatBackend;
pub use config::AppConfig;
pub use evolution::{EvolutionConfig, EvolutionController};
pub use fitness::{FitnessReport, FitnessWeights};
pub use guardian::Guardian;
pub use lineage::LineagePersistence;
pub use mutator::MutationType;
pub use scenarios::{load_external_scenarios, ScenarioGenerator};
pub use sentinel::{SentinelConfig, SentinelVerdict};
pub use store::{EncryptionKey, RecordStore, SqliteRecordStore};
