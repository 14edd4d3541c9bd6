//! Flattening of one-to-many nested records into one row per child.
//!
//! Every output row is built from one child element joined with its parent, so
//! parent fields are broadcast verbatim onto each derived row. Output order is
//! parent order, then child order within a parent. A parent whose child list is
//! absent, `null` or empty contributes no rows.
//!
//! The join is typed, so a parent cannot lack a broadcast field: required
//! fields are enforced when the parent and child documents are deserialized.

#[derive(Debug, Clone, PartialEq)]
pub struct Exploded<R> {
    pub rows: Vec<R>,
    /// Parents that produced no rows.
    pub childless: usize,
}

/// Typed flattening: join every child of every parent into an output row.
pub fn explode<P, C, R, F, J>(parents: &[P], children_of: F, mut join: J) -> Exploded<R>
where
    F: Fn(&P) -> Option<&[C]>,
    J: FnMut(&P, &C) -> R,
{
    let mut rows = Vec::with_capacity(parents.len());
    let mut childless = 0;

    for parent in parents {
        match children_of(parent) {
            Some(children) if !children.is_empty() => {
                rows.extend(children.iter().map(|child| join(parent, child)));
            }
            _ => childless += 1,
        }
    }

    Exploded { rows, childless }
}
