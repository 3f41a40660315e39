//! Demon negotiation: entities, question selection, and the session
//! state machine that decides whether a demon joins or flees.

pub mod demon;
pub mod feedback;
pub mod minigame;
pub mod player;
pub mod question;
pub mod selection;
pub mod session;
pub mod whim;

pub use demon::{canonical_id, Demon, Personality, Reaction};
pub use feedback::{
    AnswerReport, MinigameOutcome, PressureReport, SessionStatus, SessionSummary, Tone, TurnReport, WhimOutcome,
};
pub use player::Player;
pub use question::{Choice, Effect, Question};
pub use selection::{ExhaustionPolicy, QuestionSelector, Selection, SelectionContext, UniformSelector};
pub use session::{FleeReason, NegotiationSession, SessionSettings, SessionState};
pub use whim::{Whim, WhimEntry, WhimKind, WhimTable};
