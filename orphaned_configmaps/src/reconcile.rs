use std::collections::BTreeSet;

/// ConfigMaps that exist but nothing uses, in ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanResult(Vec<String>);

impl OrphanResult {
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `inventory - (used + exceptions)`, sorted. Exact name matching only.
pub fn reconcile<'a, I, U, E>(inventory: I, used: U, exceptions: E) -> OrphanResult
where
    I: IntoIterator<Item = &'a String>,
    U: IntoIterator<Item = &'a String>,
    E: IntoIterator<Item = &'a String>,
{
    let keep: BTreeSet<&str> = used
        .into_iter()
        .chain(exceptions)
        .map(String::as_str)
        .collect();

    let orphaned: BTreeSet<&str> = inventory
        .into_iter()
        .map(String::as_str)
        .filter(|name| !keep.contains(name))
        .collect();

    OrphanResult(orphaned.into_iter().map(str::to_owned).collect())
}
