// src/critical_chain.rs
//
// Builds the minimal edge set that keeps every spatial participant connected
// along each directional axis, so that pruning can never strand an object.
//
// Four independent passes over the non-portable/non-opening objects:
//   x ascending            -> "to the left of" chain
//   x descending           -> "to the right of" chain
//   input y descending     -> "in front of" chain (ascending in flipped y)
//   input y ascending      -> "behind" chain
//
// Each pass walks the sorted sequence with three named phases per position:
//   SCAN_FORWARD   nearest following object that satisfies the predicate
//   SCAN_BACKWARD  fall back to a preceding object; a duplicate hit records
//                  a skip instead of an edge
//   RESOLVE_SKIPS  at the last position, scan backward for fresh edges,
//                  consuming one recorded skip per new edge
//
// The forward bias keeps edges short (adjacent neighbors where the geometry
// allows it); the backward phases handle objects whose nearest neighbor in
// sort order does not actually satisfy the predicate (vertically offset
// ties and the like).

use std::collections::HashMap;
use std::collections::HashSet;

use crate::predicates::{Predicate, PredicateClassifier, Relation};
use crate::records::DetectedObject;

/// Edges per directional predicate produced by the chain builder for one
/// image. Invariant input to the pruner: these edges must survive pruning.
#[derive(Debug, Clone)]
pub struct CriticalCounts {
    counts: HashMap<Predicate, usize>,
}

impl CriticalCounts {
    pub const TRACKED: [Predicate; 4] = [
        Predicate::ToTheLeftOf,
        Predicate::ToTheRightOf,
        Predicate::InFrontOf,
        Predicate::Behind,
    ];

    pub fn new() -> Self {
        Self {
            counts: Self::TRACKED.iter().map(|p| (*p, 0)).collect(),
        }
    }

    /// Counts the tracked predicates in an already-built edge list. The
    /// builder maintains its counts incrementally; this exists for callers
    /// that hold a chain prefix and need its counts back.
    pub fn tally<'r>(relations: impl IntoIterator<Item = &'r Relation>) -> Self {
        let mut counts = Self::new();
        for relation in relations {
            counts.increment(relation.predicate);
        }
        counts
    }

    fn increment(&mut self, predicate: Predicate) {
        if let Some(count) = self.counts.get_mut(&predicate) {
            *count += 1;
        }
    }

    /// The floor for a tracked predicate; `None` for everything else.
    pub fn requirement(&self, predicate: Predicate) -> Option<usize> {
        self.counts.get(&predicate).copied()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl Default for CriticalCounts {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChainResult {
    /// Chain edges in emission order; the assembler keeps them as the
    /// protected prefix of the image's relation list.
    pub relations: Vec<Relation>,
    pub counts: CriticalCounts,
}

pub struct CriticalChainBuilder<'a> {
    classifier: &'a PredicateClassifier,
}

impl<'a> CriticalChainBuilder<'a> {
    pub fn new(classifier: &'a PredicateClassifier) -> Self {
        Self { classifier }
    }

    pub fn build(&self, objects: &[DetectedObject]) -> ChainResult {
        let participants: Vec<&DetectedObject> = objects
            .iter()
            .filter(|o| self.classifier.is_spatial_participant(o))
            .collect();

        let mut relations = Vec::new();
        let mut seen: HashSet<Relation> = HashSet::new();
        let mut counts = CriticalCounts::new();

        let mut by_x = participants.clone();
        by_x.sort_by(|a, b| a.bounding_box[0].total_cmp(&b.bounding_box[0]));
        self.run_axis(&by_x, Predicate::ToTheLeftOf, &mut relations, &mut seen, &mut counts);
        by_x.reverse();
        self.run_axis(&by_x, Predicate::ToTheRightOf, &mut relations, &mut seen, &mut counts);

        // Larger input y = lower in the image = nearer the camera.
        let mut by_depth = participants;
        by_depth.sort_by(|a, b| b.bounding_box[1].total_cmp(&a.bounding_box[1]));
        self.run_axis(&by_depth, Predicate::InFrontOf, &mut relations, &mut seen, &mut counts);
        by_depth.reverse();
        self.run_axis(&by_depth, Predicate::Behind, &mut relations, &mut seen, &mut counts);

        ChainResult { relations, counts }
    }

    fn holds(&self, sub: &DetectedObject, obj: &DetectedObject, target: Predicate) -> bool {
        self.classifier.classify(sub, obj).contains(&target)
    }

    fn run_axis(
        &self,
        order: &[&DetectedObject],
        target: Predicate,
        relations: &mut Vec<Relation>,
        seen: &mut HashSet<Relation>,
        counts: &mut CriticalCounts,
    ) {
        let n = order.len();
        if n < 2 {
            return;
        }
        let mut skipped = 0usize;

        for i in 0..n {
            if i + 1 == n {
                // RESOLVE_SKIPS
                for ti in (0..i).rev() {
                    if skipped == 0 {
                        break;
                    }
                    if !self.holds(order[ti], order[i], target) {
                        continue;
                    }
                    let relation = Relation::new(order[ti], target, order[i]);
                    if seen.insert(relation) {
                        relations.push(relation);
                        counts.increment(target);
                        skipped -= 1;
                    }
                }
                continue;
            }

            // SCAN_FORWARD
            let mut matched = false;
            for j in i + 1..n {
                if self.holds(order[i], order[j], target) {
                    let relation = Relation::new(order[i], target, order[j]);
                    if seen.insert(relation) {
                        relations.push(relation);
                        counts.increment(target);
                    }
                    matched = true;
                    break;
                }
            }
            if matched {
                continue;
            }

            // SCAN_BACKWARD
            for ti in (0..i).rev() {
                if self.holds(order[ti], order[i], target) {
                    let relation = Relation::new(order[ti], target, order[i]);
                    if !seen.insert(relation) {
                        skipped += 1;
                    } else {
                        relations.push(relation);
                        counts.increment(target);
                    }
                    break;
                }
            }
        }
    }
}
