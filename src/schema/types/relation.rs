use serde::{Deserialize, Serialize};
use std::fmt;

/// Cardinality of a relation attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    MorphOne,
    MorphMany,
    MorphToOne,
    MorphToMany,
}

/// Which field of a relation attribute names the opposite attribute.
///
/// The `inversedBy` side owns the join, `mappedBy` points back at the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationSide {
    InversedBy,
    MappedBy,
}

impl RelationKind {
    /// Symmetric kinds where the caller picks the owning side via `dominant`
    pub fn is_symmetric(self) -> bool {
        matches!(self, RelationKind::OneToOne | RelationKind::ManyToMany)
    }

    pub fn is_morph(self) -> bool {
        matches!(
            self,
            RelationKind::MorphOne
                | RelationKind::MorphMany
                | RelationKind::MorphToOne
                | RelationKind::MorphToMany
        )
    }

    /// Relation kind and side of the attribute mirrored onto the target.
    ///
    /// Morph relations have no mirror.
    pub fn mirror(self, dominant: bool) -> Option<(RelationKind, RelationSide)> {
        let symmetric_side = if dominant {
            RelationSide::MappedBy
        } else {
            RelationSide::InversedBy
        };

        match self {
            RelationKind::OneToOne => Some((RelationKind::OneToOne, symmetric_side)),
            RelationKind::OneToMany => Some((RelationKind::ManyToOne, RelationSide::InversedBy)),
            RelationKind::ManyToOne => Some((RelationKind::OneToMany, RelationSide::MappedBy)),
            RelationKind::ManyToMany => Some((RelationKind::ManyToMany, symmetric_side)),
            RelationKind::MorphOne
            | RelationKind::MorphMany
            | RelationKind::MorphToOne
            | RelationKind::MorphToMany => None,
        }
    }

    /// Side stored on the source attribute when it is converted from the wire shape
    pub fn stored_side(self, dominant: Option<bool>) -> Option<RelationSide> {
        match (self, dominant) {
            (kind, Some(true)) if kind.is_symmetric() => Some(RelationSide::InversedBy),
            (kind, Some(false)) if kind.is_symmetric() => Some(RelationSide::MappedBy),
            (RelationKind::OneToOne | RelationKind::ManyToOne | RelationKind::ManyToMany, _) => {
                Some(RelationSide::InversedBy)
            }
            (RelationKind::OneToMany, _) => Some(RelationSide::MappedBy),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::OneToOne => "oneToOne",
            RelationKind::OneToMany => "oneToMany",
            RelationKind::ManyToOne => "manyToOne",
            RelationKind::ManyToMany => "manyToMany",
            RelationKind::MorphOne => "morphOne",
            RelationKind::MorphMany => "morphMany",
            RelationKind::MorphToOne => "morphToOne",
            RelationKind::MorphToMany => "morphToMany",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_table() {
        use RelationKind::*;
        use RelationSide::*;

        assert_eq!(OneToOne.mirror(true), Some((OneToOne, MappedBy)));
        assert_eq!(OneToOne.mirror(false), Some((OneToOne, InversedBy)));
        assert_eq!(OneToMany.mirror(false), Some((ManyToOne, InversedBy)));
        assert_eq!(ManyToOne.mirror(true), Some((OneToMany, MappedBy)));
        assert_eq!(ManyToMany.mirror(true), Some((ManyToMany, MappedBy)));
        assert_eq!(ManyToMany.mirror(false), Some((ManyToMany, InversedBy)));
        assert_eq!(MorphToMany.mirror(true), None);
    }

    #[test]
    fn test_stored_side() {
        use RelationKind::*;
        use RelationSide::*;

        assert_eq!(OneToOne.stored_side(Some(true)), Some(InversedBy));
        assert_eq!(ManyToMany.stored_side(Some(false)), Some(MappedBy));
        assert_eq!(OneToOne.stored_side(None), Some(InversedBy));
        assert_eq!(ManyToOne.stored_side(Some(false)), Some(InversedBy));
        assert_eq!(OneToMany.stored_side(Some(true)), Some(MappedBy));
        assert_eq!(MorphOne.stored_side(None), None);
    }

    #[test]
    fn test_wire_names() {
        let kind: RelationKind = serde_json::from_str("\"morphToMany\"").unwrap();
        assert_eq!(kind, RelationKind::MorphToMany);
        assert_eq!(
            serde_json::to_string(&RelationKind::ManyToOne).unwrap(),
            "\"manyToOne\""
        );
    }
}
