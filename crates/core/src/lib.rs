#![forbid(unsafe_code)]

pub mod ids {
    /// Entity ids (users, notes, votes, …) are time-ordered strings: creation
    /// order and lexicographic order agree, so `MAX(id)` picks the most
    /// recent row and `ORDER BY id` is chronological.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum EntityIdError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
    }

    pub fn validate_entity_id(value: &str) -> Result<(), EntityIdError> {
        if value.is_empty() {
            return Err(EntityIdError::Empty);
        }
        if value.len() > 32 {
            return Err(EntityIdError::TooLong);
        }
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(EntityIdError::Empty);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(EntityIdError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate() {
            if index == 0 {
                continue;
            }
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
                continue;
            }
            return Err(EntityIdError::InvalidChar { ch, index });
        }
        Ok(())
    }
}

pub mod model {
    /// Note visibility after the `remove-hidden-visibility` ChangeSet. The
    /// legacy `hidden` level exists only in pre-migration rows and maps to
    /// `Specified` with an empty recipient list.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Visibility {
        Public,
        Home,
        Followers,
        Specified,
    }

    impl Visibility {
        pub fn as_str(self) -> &'static str {
            match self {
                Visibility::Public => "public",
                Visibility::Home => "home",
                Visibility::Followers => "followers",
                Visibility::Specified => "specified",
            }
        }

        pub fn parse(value: &str) -> Result<Self, VisibilityError> {
            match value {
                "public" => Ok(Visibility::Public),
                "home" => Ok(Visibility::Home),
                "followers" => Ok(Visibility::Followers),
                "specified" => Ok(Visibility::Specified),
                "hidden" => Err(VisibilityError::Removed),
                _ => Err(VisibilityError::Unknown),
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum VisibilityError {
        /// `hidden` was removed from the domain; pre-migration rows carry it.
        Removed,
        Unknown,
    }

    /// The lowest voter count consistent with the per-option tallies.
    ///
    /// Multi-choice polls: one voter can account for every option, so the
    /// floor is the largest single tally. Single-choice polls: each ballot
    /// sits in exactly one option, so the floor is the sum.
    pub fn tally_floor(multiple: bool, votes: &[i64]) -> i64 {
        if multiple {
            votes.iter().copied().max().unwrap_or(0)
        } else {
            votes.iter().sum()
        }
    }
}
