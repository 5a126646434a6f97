//! Match session: command/query API and the tick pipeline

pub mod match_session;
pub mod tick;

pub use match_session::MatchSession;
