//! Steam activity supplier abstraction
//!
//! The recommendation pipeline only needs three lookups from Steam: the games a
//! user owns, what they (and their friends) played recently, and who their
//! friends are. Keeping them behind a trait lets tests and alternative
//! backends stand in for the Web API.
use crate::{
    error::AppResult,
    models::{Friend, OwnedGame, RecentGame},
};

pub mod steam;

pub use steam::SteamClient;

/// Number of recently played games requested per account
pub const RECENT_GAMES_COUNT: u32 = 100;

#[async_trait::async_trait]
pub trait SteamProvider: Send + Sync {
    /// Games in the account's library, with lifetime playtime
    async fn owned_games(&self, steam_id: &str) -> AppResult<Vec<OwnedGame>>;

    /// Games played in the last two weeks, at most `count`
    async fn recently_played(&self, steam_id: &str, count: u32) -> AppResult<Vec<RecentGame>>;

    /// The account's friend list
    async fn friends(&self, steam_id: &str) -> AppResult<Vec<Friend>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
