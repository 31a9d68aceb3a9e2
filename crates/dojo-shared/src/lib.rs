//! Domain types shared by `dojo-core` and `dojo-cli`: the data model, the
//! chat-backend seam, and the error taxonomy.

pub mod chat;
pub mod enums;
pub mod error;
pub mod prompt;
pub mod record;
pub mod scenario;

pub use chat::{ChatBackend, ChatMessage, ChatRole};
pub use enums::{Decision, Difficulty, ProfileType, ScenarioType, Specialization};
pub use error::{DojoError, DojoResult};
pub use prompt::{EvolvedPrompt, GenerationSummary, GraduatedGuardian, LineageStore};
pub use record::InteractionRecord;
pub use scenario::{GroundTruth, PolicyRule, Scenario, ScenarioContext, SenderProfile};
