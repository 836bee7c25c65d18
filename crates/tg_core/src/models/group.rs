use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard cap on affinity group size imposed by group formation.
pub const MAX_GROUP_SIZE: usize = 4;

/// Fixed color palette cycled by group index.
pub const GROUP_COLORS: [&str; 8] = [
    "#e63946", "#f4a261", "#e9c46a", "#2a9d8f", "#457b9d", "#8e7dbe", "#d67ab1", "#6d9f71",
];

/// Sequential letter label for a group index: A..Z, then AA, AB, ...
pub fn group_label(index: usize) -> String {
    let mut label = String::new();
    let mut n = index;
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

pub fn group_color(index: usize) -> &'static str {
    GROUP_COLORS[index % GROUP_COLORS.len()]
}

/// A set of players placed on the same team together or not at all.
///
/// Groups produced by formation always satisfy `1 < len <= MAX_GROUP_SIZE`;
/// caller-supplied custom groups may be larger and are checked by the
/// pre-generation validation pass instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGroup {
    pub id: Uuid,
    pub label: String,
    pub color: String,
    pub player_ids: Vec<Uuid>,
}

impl PlayerGroup {
    pub fn new(index: usize, player_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: group_label(index),
            color: group_color(index).to_string(),
            player_ids,
        }
    }

    pub fn len(&self) -> usize {
        self.player_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.player_ids.is_empty()
    }

    pub fn contains(&self, player_id: Uuid) -> bool {
        self.player_ids.contains(&player_id)
    }
}
