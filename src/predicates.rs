// src/predicates.rs
//
// Rule-based predicate inference over ordered object pairs.
//
// Rule order (all applicable rules fire, a pair can collect several labels):
//   1. Opening-in-building "located in" (subject fully inside the building)
//   2. Spatial axis predicates, only when neither side is portable/opening:
//      left/right on x, then the flying override (above / below / both
//      flying), else front/behind on flipped y
//   3. Personnel rules: holding / inside / riding
//   4. "Multi-story" is object-level, not pair-level: see `is_multi_story`,
//      evaluated once per object by the assembler
//
// "both flying" and "Multi-story" never become triples; they exist to flag
// images for human review.

use std::collections::HashSet;
use std::fmt;

use crate::geometry::{classify_overlap, Extent, Overlap};
use crate::records::{DetectedObject, Triple};
use crate::types::TaxonomyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    LocatedIn,
    ToTheLeftOf,
    ToTheRightOf,
    Above,
    Below,
    InFrontOf,
    Behind,
    Holding,
    Inside,
    Riding,
    BothFlying,
    MultiStory,
}

impl Predicate {
    /// Vocabulary order. Also the deterministic scan order wherever a draw
    /// over predicates is needed.
    pub const ALL: [Predicate; 12] = [
        Predicate::LocatedIn,
        Predicate::ToTheLeftOf,
        Predicate::ToTheRightOf,
        Predicate::Above,
        Predicate::Below,
        Predicate::InFrontOf,
        Predicate::Behind,
        Predicate::Holding,
        Predicate::Inside,
        Predicate::Riding,
        Predicate::BothFlying,
        Predicate::MultiStory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocatedIn => "located in",
            Self::ToTheLeftOf => "to the left of",
            Self::ToTheRightOf => "to the right of",
            Self::Above => "above",
            Self::Below => "below",
            Self::InFrontOf => "in front of",
            Self::Behind => "behind",
            Self::Holding => "holding",
            Self::Inside => "inside",
            Self::Riding => "riding",
            Self::BothFlying => "both flying",
            Self::MultiStory => "Multi-story",
        }
    }

    /// Internal signals are never emitted as triples.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::BothFlying | Self::MultiStory)
    }

    /// Predicates whose correctness needs a human judgment call.
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            Self::Holding | Self::Riding | Self::Inside | Self::BothFlying | Self::MultiStory
        )
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relation between two objects of one image, keyed by ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relation {
    pub subject_id: u32,
    pub predicate: Predicate,
    pub object_id: u32,
}

impl Relation {
    pub fn new(subject: &DetectedObject, predicate: Predicate, object: &DetectedObject) -> Self {
        Self {
            subject_id: subject.object_id,
            predicate,
            object_id: object.object_id,
        }
    }

    pub fn to_triple(self) -> Triple {
        Triple {
            subject_id: self.subject_id,
            predicate: self.predicate.as_str().to_string(),
            object_id: self.object_id,
        }
    }
}

/// Pure pair classifier over an immutable taxonomy.
pub struct PredicateClassifier {
    portables: HashSet<String>,
    openings: HashSet<String>,
    vehicles: HashSet<String>,
    personnel_marker: String,
    building_class: String,
    flying_attribute: String,
    single_story_marker: String,
}

impl PredicateClassifier {
    pub fn new(taxonomy: &TaxonomyConfig) -> Self {
        Self {
            portables: taxonomy.portables.iter().cloned().collect(),
            openings: taxonomy.openings.iter().cloned().collect(),
            vehicles: taxonomy.vehicles.iter().cloned().collect(),
            personnel_marker: taxonomy.personnel_marker.clone(),
            building_class: taxonomy.building_class.clone(),
            flying_attribute: taxonomy.flying_attribute.clone(),
            single_story_marker: taxonomy.single_story_marker.clone(),
        }
    }

    pub fn is_portable(&self, object: &DetectedObject) -> bool {
        self.portables.contains(&object.class)
    }

    pub fn is_opening(&self, object: &DetectedObject) -> bool {
        self.openings.contains(&object.class)
    }

    pub fn is_building(&self, object: &DetectedObject) -> bool {
        object.class == self.building_class
    }

    pub fn is_personnel(&self, object: &DetectedObject) -> bool {
        object.class.contains(&self.personnel_marker)
    }

    /// Objects that take part in the spatial axes and the critical chains.
    pub fn is_spatial_participant(&self, object: &DetectedObject) -> bool {
        !self.is_portable(object) && !self.is_opening(object)
    }

    fn is_flying(&self, object: &DetectedObject) -> bool {
        object.primary_attribute() == Some(self.flying_attribute.as_str())
    }

    /// Buildings tagged with a story attribute other than the single-story
    /// marker. Object-level: depends only on `object`, so the assembler
    /// evaluates it once per object instead of once per pair.
    pub fn is_multi_story(&self, object: &DetectedObject) -> bool {
        if !self.is_building(object) {
            return false;
        }
        match object.primary_attribute() {
            Some(attribute) => {
                attribute.split('-').next().unwrap_or("") != self.single_story_marker
            }
            None => false,
        }
    }

    /// Applies the pair rules to (subject, object), in rule order.
    pub fn classify(&self, sub: &DetectedObject, obj: &DetectedObject) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        let sub_ext = Extent::of(sub);
        let obj_ext = Extent::of(obj);

        if self.is_opening(sub) {
            if self.is_building(obj)
                && classify_overlap(&sub_ext, &obj_ext) == Overlap::FirstWithinSecond
            {
                predicates.push(Predicate::LocatedIn);
            }
        } else if !self.is_portable(sub) && !self.is_portable(obj) && !self.is_opening(obj) {
            // Horizontal: the far edge and the center must both clear.
            if obj_ext.x_center < sub_ext.x_min && obj_ext.x_max < sub_ext.x_center {
                predicates.push(Predicate::ToTheRightOf);
            } else if sub_ext.x_center < obj_ext.x_min && sub_ext.x_max < obj_ext.x_center {
                predicates.push(Predicate::ToTheLeftOf);
            }

            // A flying side overrides the depth comparison entirely.
            let sub_flying = self.is_flying(sub);
            let obj_flying = self.is_flying(obj);
            if sub_flying || obj_flying {
                if sub_flying && !obj_flying {
                    predicates.push(Predicate::Above);
                } else if !sub_flying && obj_flying {
                    predicates.push(Predicate::Below);
                } else {
                    predicates.push(Predicate::BothFlying);
                }
            } else if obj_ext.y_center < sub_ext.y_min && obj_ext.y_max < sub_ext.y_center {
                predicates.push(Predicate::Behind);
            } else if sub_ext.y_center < obj_ext.y_min && sub_ext.y_max < obj_ext.y_center {
                predicates.push(Predicate::InFrontOf);
            }
        }

        if self.is_personnel(sub) {
            if self.is_portable(obj) {
                if classify_overlap(&sub_ext, &obj_ext) != Overlap::Disjoint {
                    predicates.push(Predicate::Holding);
                }
            } else if self.is_building(obj) {
                if classify_overlap(&sub_ext, &obj_ext) == Overlap::FirstWithinSecond {
                    predicates.push(Predicate::Inside);
                }
            } else {
                // "Destroyed MBT" rides like an "MBT".
                let base_class = obj.class.split_whitespace().last().unwrap_or("");
                if self.vehicles.contains(base_class)
                    && classify_overlap(&sub_ext, &obj_ext) == Overlap::FirstWithinSecond
                {
                    predicates.push(Predicate::Riding);
                }
            }
        }

        predicates
    }
}
