//! Summarises how one qualifier's values vary across a population.
//!
//! Both classifiers are pure and order independent.

use std::fmt::Display;

use hashbrown::HashSet;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distribution {
    AllPresentAllSame,
    AllPresentAllUnique,
    AllPresentSomeDuplicate,
    SomeMissingAllSame,
    SomeMissingAllUnique,
    SomeMissingSomeDuplicate,
}

impl Distribution {
    pub fn has_missing(&self) -> bool {
        matches!(
            self,
            Distribution::SomeMissingAllSame
                | Distribution::SomeMissingAllUnique
                | Distribution::SomeMissingSomeDuplicate
        )
    }

    pub fn has_duplicates(&self) -> bool {
        matches!(
            self,
            Distribution::AllPresentSomeDuplicate | Distribution::SomeMissingSomeDuplicate
        )
    }
}

impl Display for Distribution {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let text = match self {
            Distribution::AllPresentAllSame => "all present, all same",
            Distribution::AllPresentAllUnique => "all present, all unique",
            Distribution::AllPresentSomeDuplicate => "all present, some duplicate",
            Distribution::SomeMissingAllSame => "some missing, all same",
            Distribution::SomeMissingAllUnique => "some missing, all unique",
            Distribution::SomeMissingSomeDuplicate => "some missing, some duplicate",
        };
        f.write_str(text)
    }
}

/// How the values of one multi-valued member relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MultiValue {
    MultiSame,
    MultiDuplicate,
    MultiAllDifferent,
}

impl Display for MultiValue {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let text = match self {
            MultiValue::MultiSame => "all identical",
            MultiValue::MultiDuplicate => "some duplicate",
            MultiValue::MultiAllDifferent => "all different",
        };
        f.write_str(text)
    }
}

/// Buckets a population where each member holds a value or is missing.
///
/// Returns `None` when no member holds a value. A population with a single
/// distinct value is reported as all same, even if it has one member.
pub fn classify<'a, I>(values: I) -> Option<Distribution>
where
    I: IntoIterator<Item = Option<&'a str>>, {
    let mut missing = false;
    let mut present = 0usize;
    let mut distinct: HashSet<&str> = HashSet::new();

    for value in values {
        match value {
            Some(value) => {
                present += 1;
                distinct.insert(value);
            },
            None => missing = true,
        }
    }
    if present == 0 {
        return None;
    }

    let bucket = match (missing, distinct.len()) {
        (false, 1) => Distribution::AllPresentAllSame,
        (false, n) if n == present => Distribution::AllPresentAllUnique,
        (false, _) => Distribution::AllPresentSomeDuplicate,
        (true, 1) => Distribution::SomeMissingAllSame,
        (true, n) if n == present => Distribution::SomeMissingAllUnique,
        (true, _) => Distribution::SomeMissingSomeDuplicate,
    };
    Some(bucket)
}

/// Classifies the values one member carries for a qualifier.
///
/// Returns `None` unless the member carries at least two values.
pub fn classify_member<S: AsRef<str>>(values: &[S]) -> Option<MultiValue> {
    if values.len() < 2 {
        return None;
    }
    let distinct = values
        .iter()
        .map(AsRef::as_ref)
        .collect::<HashSet<&str>>()
        .len();

    let kind = if distinct == 1 {
        MultiValue::MultiSame
    }
    else if distinct == values.len() {
        MultiValue::MultiAllDifferent
    }
    else {
        MultiValue::MultiDuplicate
    };
    Some(kind)
}
