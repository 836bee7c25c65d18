//! # tg_core - Constraint-Aware Team Generation Engine
//!
//! This library turns a flat roster of players into balanced teams while
//! honoring free-text teammate requests, avoid requests, gender quotas,
//! and explicit player groups.
//!
//! ## Features
//! - Fuzzy name resolution (nicknames, phonetics, typos) for requests
//! - Mutual-request groups capped at four players
//! - Deterministic generation (same seed = same teams)
//! - Post-assignment skill balancing that never breaks constraints

pub mod assignment;
pub mod avoid;
pub mod balance;
pub mod error;
pub mod generation;
pub mod grouping;
pub mod matching;
pub mod models;
pub mod stats;

// Re-export the main pipeline entry points
pub use generation::{
    generate_teams, GenerationDiagnostics, GenerationOptions, GenerationResult,
};

// Re-export core model types
pub use models::{Gender, LeagueConfig, Player, PlayerGroup, Team};

// Re-export name matching
pub use matching::{MatchConfidence, NameMatch, NameResolver, ACCEPT_THRESHOLD};

// Re-export assignment and movement
pub use assignment::{
    build_units, move_player, AssignMode, ConstraintAssigner, ConstraintUnit, UnitPriority,
};

// Re-export grouping
pub use grouping::{form_groups, validate_groups_for_generation, FormationOutput};

pub use avoid::AvoidSet;
pub use balance::{BalanceReport, BalancerConfig, SkillBalancer};
pub use error::{GenerationError, MoveError, Result};
pub use stats::{collect_stats, GenerationStats};
