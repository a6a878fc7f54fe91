// src/pruner.rs
//
// Reduces an oversized relation set down to the budget. Critical chain edges
// occupy the front of the list and are never touched; for the four tracked
// directional predicates only positions past that prefix are eligible.
//
// Each round removes one random eligible relation of whichever predicate is
// currently most over-represented. Randomness comes from an injected source,
// so a fixed seed makes the result reproducible. When only critical edges of
// the tracked predicates remain the floor can sit above the budget; that
// oversized result is returned as-is.

use std::collections::HashMap;

use rand::Rng;

use crate::critical_chain::CriticalCounts;
use crate::predicates::{Predicate, Relation};

pub struct GraphPruner {
    budget: usize,
}

impl GraphPruner {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    pub fn prune<R: Rng>(
        &self,
        mut relations: Vec<Relation>,
        counts: &CriticalCounts,
        rng: &mut R,
    ) -> Vec<Relation> {
        let protected = counts.total();

        while relations.len() > self.budget {
            let mut totals: HashMap<Predicate, usize> = HashMap::new();
            let mut removables: HashMap<Predicate, usize> = HashMap::new();
            for (index, relation) in relations.iter().enumerate() {
                *totals.entry(relation.predicate).or_insert(0) += 1;
                if Self::eligible(index, relation.predicate, counts, protected) {
                    *removables.entry(relation.predicate).or_insert(0) += 1;
                }
            }

            // Most over-represented predicate that still has removable
            // relations; count ties resolved by a uniform draw in vocabulary
            // order.
            let max_total = Predicate::ALL
                .iter()
                .filter(|p| removables.get(*p).copied().unwrap_or(0) > 0)
                .map(|p| totals[p])
                .max();
            let Some(max_total) = max_total else {
                break;
            };
            let tied: Vec<Predicate> = Predicate::ALL
                .iter()
                .copied()
                .filter(|p| {
                    removables.get(p).copied().unwrap_or(0) > 0 && totals[p] == max_total
                })
                .collect();
            let target = if tied.len() == 1 {
                tied[0]
            } else {
                tied[rng.random_range(0..tied.len())]
            };

            let positions: Vec<usize> = relations
                .iter()
                .enumerate()
                .filter(|(index, relation)| {
                    relation.predicate == target
                        && Self::eligible(*index, target, counts, protected)
                })
                .map(|(index, _)| index)
                .collect();
            let victim = positions[rng.random_range(0..positions.len())];
            relations.remove(victim);
        }

        relations
    }

    fn eligible(
        index: usize,
        predicate: Predicate,
        counts: &CriticalCounts,
        protected: usize,
    ) -> bool {
        counts.requirement(predicate).is_none() || index >= protected
    }
}
