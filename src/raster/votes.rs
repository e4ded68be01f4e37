//! Stimmen-Sammlung: welche Vorlagen-Zelle landet in welcher Zielzelle?

use glam::IVec3;
use indexmap::IndexMap;

/// Vorlagen-Koordinate `(layer, width, length)`.
pub type TemplateCell = (usize, usize, usize);

/// Zählt pro Zielzelle, wie oft jede Vorlagen-Zelle dort gelandet ist.
///
/// Einfüge-Reihenfolge bleibt erhalten (Ziele und Kandidaten), damit die
/// Auflösung deterministisch ist. Lebt genau einen Batch.
#[derive(Debug, Clone, Default)]
pub struct VoteMap {
    targets: IndexMap<IVec3, IndexMap<TemplateCell, u32>>,
}

impl VoteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Eine Stimme für `cell` in Zielzelle `target`.
    pub fn cast(&mut self, target: IVec3, cell: TemplateCell) {
        *self
            .targets
            .entry(target)
            .or_default()
            .entry(cell)
            .or_insert(0) += 1;
    }

    /// Anzahl Zielzellen.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Stimmen für `cell` in `target`.
    pub fn count(&self, target: IVec3, cell: TemplateCell) -> u32 {
        self.targets
            .get(&target)
            .and_then(|votes| votes.get(&cell))
            .copied()
            .unwrap_or(0)
    }

    /// Gewinner je Zielzelle in Einfüge-Reihenfolge.
    ///
    /// Nur eine echt höhere Stimmenzahl verdrängt den bisherigen Kandidaten,
    /// bei Gleichstand gewinnt die zuerst eingefügte Vorlagen-Zelle.
    pub fn winners(&self) -> impl Iterator<Item = (IVec3, TemplateCell)> + '_ {
        self.targets
            .iter()
            .filter_map(|(&target, votes)| resolve(votes).map(|cell| (target, cell)))
    }
}

fn resolve(votes: &IndexMap<TemplateCell, u32>) -> Option<TemplateCell> {
    let mut best: Option<(TemplateCell, u32)> = None;
    for (&cell, &count) in votes {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((cell, count)),
        }
    }
    best.map(|(cell, _)| cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(map: &mut VoteMap, target: IVec3, cell: TemplateCell, n: u32) {
        for _ in 0..n {
            map.cast(target, cell);
        }
    }

    #[test]
    fn higher_count_wins() {
        let mut map = VoteMap::new();
        let target = IVec3::new(1, 2, 3);
        vote(&mut map, target, (0, 0, 0), 3);
        vote(&mut map, target, (0, 1, 0), 5);
        let winners: Vec<_> = map.winners().collect();
        assert_eq!(winners, vec![(target, (0, 1, 0))]);
    }

    #[test]
    fn tie_keeps_first_inserted() {
        let mut map = VoteMap::new();
        let target = IVec3::ZERO;
        vote(&mut map, target, (1, 0, 0), 4);
        vote(&mut map, target, (0, 0, 0), 4);
        assert_eq!(map.winners().next(), Some((target, (1, 0, 0))));
    }

    #[test]
    fn winners_follow_target_insertion_order() {
        let mut map = VoteMap::new();
        let a = IVec3::new(5, 0, 0);
        let b = IVec3::new(-5, 0, 0);
        map.cast(a, (0, 0, 0));
        map.cast(b, (0, 0, 0));
        map.cast(a, (0, 0, 0));
        let targets: Vec<_> = map.winners().map(|(t, _)| t).collect();
        assert_eq!(targets, vec![a, b]);
        assert_eq!(map.count(a, (0, 0, 0)), 2);
        assert_eq!(map.len(), 2);
    }
}
