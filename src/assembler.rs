// src/assembler.rs
//
// Exhaustive pairwise enumeration on top of the critical chains. The chain
// edges stay at the front of the relation list; everything the enumeration
// adds is new and deduplicated against them. Internal predicates never become
// relations but still feed the per-image ambiguity flags.

use std::collections::{BTreeSet, HashSet};

use crate::critical_chain::{ChainResult, CriticalChainBuilder, CriticalCounts};
use crate::predicates::{Predicate, PredicateClassifier, Relation};
use crate::records::DetectedObject;

pub struct AssembledGraph {
    /// Critical chain edges first, then the exhaustive additions.
    pub relations: Vec<Relation>,
    pub counts: CriticalCounts,
    /// Sorted, deduplicated ambiguity predicate names; empty when the image
    /// needs no human review.
    pub ambiguities: Vec<String>,
}

pub struct GraphAssembler<'a> {
    classifier: &'a PredicateClassifier,
}

impl<'a> GraphAssembler<'a> {
    pub fn new(classifier: &'a PredicateClassifier) -> Self {
        Self { classifier }
    }

    pub fn assemble(&self, objects: &[DetectedObject]) -> AssembledGraph {
        let ChainResult {
            mut relations,
            counts,
        } = CriticalChainBuilder::new(self.classifier).build(objects);
        let mut seen: HashSet<Relation> = relations.iter().copied().collect();
        let mut flagged: BTreeSet<&'static str> = BTreeSet::new();

        // Object-level signal, independent of the pair loop.
        for object in objects {
            if self.classifier.is_multi_story(object) {
                flagged.insert(Predicate::MultiStory.as_str());
            }
        }

        // The enumeration runs over the full object list, portables and
        // openings included, unlike the chain passes.
        for (i, sub) in objects.iter().enumerate() {
            for (j, obj) in objects.iter().enumerate() {
                if i == j {
                    continue;
                }
                for predicate in self.classifier.classify(sub, obj) {
                    if !predicate.is_internal() {
                        let relation = Relation::new(sub, predicate, obj);
                        if seen.insert(relation) {
                            relations.push(relation);
                        }
                    }
                    if predicate.is_ambiguous() {
                        flagged.insert(predicate.as_str());
                    }
                }
            }
        }

        AssembledGraph {
            relations,
            counts,
            ambiguities: flagged.into_iter().map(str::to_string).collect(),
        }
    }
}
