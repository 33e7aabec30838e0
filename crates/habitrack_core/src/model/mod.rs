//! Tracker domain model.
//!
//! # Responsibility
//! - Define the records owned by the store: users, habits, progress entries,
//!   goals.
//! - Give every record a typed identifier so ids of different entities cannot
//!   be mixed up in signatures.
//!
//! # Invariants
//! - Habits and goals belong to exactly one user; the owner never changes.
//! - Progress entries belong to exactly one habit.

pub mod goal;
pub mod habit;
pub mod user;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw row id as stored in SQLite.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Row id of a registered user.
    UserId
);
entity_id!(
    /// Row id of a habit.
    HabitId
);
entity_id!(
    /// Row id of one dated progress entry.
    ProgressId
);
entity_id!(
    /// Row id of a goal.
    GoalId
);

#[cfg(test)]
mod tests {
    use super::{HabitId, UserId};

    #[test]
    fn ids_display_as_raw_numbers() {
        assert_eq!(HabitId(42).to_string(), "42");
        assert_eq!(UserId(7).get(), 7);
    }
}
