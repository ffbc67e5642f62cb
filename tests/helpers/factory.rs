use super::factories::{HlQueryFactory, ScriptedSession, SeriesFactory};

pub struct Factory;

impl Factory {
    pub fn series() -> SeriesFactory {
        SeriesFactory::new()
    }

    pub fn hl_query() -> HlQueryFactory {
        HlQueryFactory::new()
    }

    pub fn session() -> ScriptedSession {
        ScriptedSession::new()
    }
}
