pub mod config;
pub mod group;
pub mod player;
pub mod team;

pub use config::LeagueConfig;
pub use group::{group_color, group_label, PlayerGroup, GROUP_COLORS, MAX_GROUP_SIZE};
pub use player::{Gender, Player, RequestFailure, RequestPriority, UnfulfilledRequest};
pub use team::{GenderBreakdown, Team};
