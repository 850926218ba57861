//! Display-name supply for new robots.
//!
//! The fleet asks a [`NameSource`] for candidates until one does not collide
//! with an existing robot. [`PoolNameSource`] combines a first and a last
//! name drawn from fixed pools and never repeats itself; [`ScriptedNames`]
//! replays a fixed list for tests.

use std::collections::{BTreeMap, VecDeque};

use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Dennis", "Donald", "Edsger", "Frances",
    "Grace", "Hedy", "John", "Joan", "Ken", "Linus", "Margaret", "Niklaus",
    "Radia", "Robin", "Shafi", "Sophie", "Tim", "Tony", "Vint", "Whitfield",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Backus", "Cerf", "Dijkstra", "Engelbart", "Floyd", "Goldwasser",
    "Hamilton", "Hopper", "Kay", "Knuth", "Lamarr", "Liskov", "Lovelace",
    "McCarthy", "Milner", "Perlman", "Ritchie", "Shannon", "Thompson",
    "Torvalds", "Turing", "Wilson", "Wirth",
];

/// A source of candidate robot names.
///
/// Candidates need not be unique; the fleet rejects collisions and asks
/// again.
pub trait NameSource: Send {
    /// Produce the next candidate name.
    fn candidate(&mut self) -> String;
}

/// Random "First Last" names from built-in pools.
///
/// The first draw of a pair yields `"First Last"`; the n-th draw of the
/// same pair yields `"First Last n"`. Every candidate is therefore distinct,
/// and the fleet's retry loop always terminates once the candidates it has
/// seen outnumber the names already taken.
#[derive(Debug, Clone)]
pub struct PoolNameSource<R> {
    rng: R,
    drawn: BTreeMap<(&'static str, &'static str), u32>,
}

impl<R: Rng> PoolNameSource<R> {
    /// Create a source drawing from `rng`.
    pub const fn new(rng: R) -> Self {
        Self {
            rng,
            drawn: BTreeMap::new(),
        }
    }

    /// Number of distinct unsuffixed names the pools can produce.
    pub const fn capacity() -> usize {
        FIRST_NAMES.len().saturating_mul(LAST_NAMES.len())
    }
}

impl<R: Rng + Send> NameSource for PoolNameSource<R> {
    fn candidate(&mut self) -> String {
        let first = pick(&mut self.rng, FIRST_NAMES);
        let last = pick(&mut self.rng, LAST_NAMES);
        let draws = self.drawn.entry((first, last)).or_insert(0);
        *draws = draws.saturating_add(1);
        match *draws {
            1 => format!("{first} {last}"),
            n => format!("{first} {last} {n}"),
        }
    }
}

fn pick<R: Rng>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    let idx = rng.random_range(0..pool.len());
    pool.get(idx).copied().unwrap_or("Robot")
}

/// Replays a fixed list of names, then repeats the last one forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedNames {
    script: VecDeque<String>,
    last: String,
}

impl ScriptedNames {
    /// Create a script from the given names.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            script: names.into_iter().map(Into::into).collect(),
            last: String::from("Robot"),
        }
    }
}

impl NameSource for ScriptedNames {
    fn candidate(&mut self) -> String {
        if let Some(next) = self.script.pop_front() {
            self.last.clone_from(&next);
            return next;
        }
        self.last.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn pool_names_are_first_last_with_optional_counter() {
        let mut names = PoolNameSource::new(SmallRng::seed_from_u64(1));
        for _ in 0..50 {
            let name = names.candidate();
            let parts: Vec<&str> = name.split(' ').collect();
            assert!(parts.len() == 2 || parts.len() == 3, "{name}");
            assert!(FIRST_NAMES.contains(parts.first().unwrap_or(&"")));
            assert!(LAST_NAMES.contains(parts.get(1).unwrap_or(&"")));
            if let Some(counter) = parts.get(2) {
                assert!(counter.parse::<u32>().is_ok_and(|n| n >= 2), "{name}");
            }
        }
    }

    #[test]
    fn pool_never_repeats_past_capacity() {
        let mut names = PoolNameSource::new(SmallRng::seed_from_u64(3));
        let total = PoolNameSource::<SmallRng>::capacity().saturating_mul(2);
        let distinct: BTreeSet<String> = (0..total).map(|_| names.candidate()).collect();
        assert_eq!(distinct.len(), total);
    }

    #[test]
    fn pool_produces_variety() {
        let mut names = PoolNameSource::new(SmallRng::seed_from_u64(99));
        let distinct: BTreeSet<String> = (0..100).map(|_| names.candidate()).collect();
        assert!(distinct.len() > 50);
        assert!(PoolNameSource::<SmallRng>::capacity() >= distinct.len());
    }

    #[test]
    fn scripted_names_repeat_last() {
        let mut names = ScriptedNames::new(["Bender", "Marvin"]);
        assert_eq!(names.candidate(), "Bender");
        assert_eq!(names.candidate(), "Marvin");
        assert_eq!(names.candidate(), "Marvin");
    }

    #[test]
    fn empty_script_yields_placeholder() {
        let mut names = ScriptedNames::default();
        assert_eq!(names.candidate(), "");
        let mut names = ScriptedNames::new(Vec::<String>::new());
        assert_eq!(names.candidate(), "Robot");
    }
}
