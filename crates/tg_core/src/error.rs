use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// A group larger than the team capacity can never be placed;
    /// generation must not proceed without caller intervention.
    #[error("group {label} has {size} members but teams hold at most {max_team_size}")]
    GroupTooLarge { label: String, size: usize, max_team_size: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("player {0} not found")]
    PlayerNotFound(uuid::Uuid),

    #[error("team {0} not found")]
    TeamNotFound(uuid::Uuid),

    #[error("team {name} is full ({size}/{max_team_size})")]
    TeamFull { name: String, size: usize, max_team_size: usize },

    #[error("move would split group {label}; pass force to override")]
    SplitsGroup { label: String },

    #[error("move would put avoiding players {player} and {other} on the same team")]
    AvoidConflict { player: String, other: String },
}

pub type Result<T> = std::result::Result<T, GenerationError>;
