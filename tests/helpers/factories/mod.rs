pub mod hl_query_factory;
pub mod scripted_session;
pub mod series_factory;

pub use hl_query_factory::HlQueryFactory;
pub use scripted_session::ScriptedSession;
pub use series_factory::SeriesFactory;
