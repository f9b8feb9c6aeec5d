//! Group ordering by priority markers
//!
//! Groups containing an earlier marker come first; everything else
//! (usually most groups) falls back to a collation-style alphabetical
//! order that is identical on every machine.

use std::cmp::Ordering;

use crate::models::GroupMap;

/// Markers used when no priority table is configured
pub const DEFAULT_PRIORITY: &[&str] = &[
    "ULUSAL", "YERLI", "YERLİ", "TR", "TÜRK", "TURK", "SPOR", "BELGESEL",
];

/// Rank of a group that matches no marker
pub const UNRANKED: usize = usize::MAX;

/// Orders group names by a priority table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRanker {
    priority: Vec<String>,
}

impl Default for GroupRanker {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY.iter().copied())
    }
}

impl GroupRanker {
    /// Markers are matched case-insensitively, earliest first
    pub fn new<I, S>(priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            priority: priority
                .into_iter()
                .map(|p| p.as_ref().to_uppercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    /// Index of the first marker the name contains, or [`UNRANKED`]
    pub fn rank(&self, group: &str) -> usize {
        let upper = group.to_uppercase();
        self.priority
            .iter()
            .position(|marker| upper.contains(marker.as_str()))
            .unwrap_or(UNRANKED)
    }

    /// Group names of a map in display order
    pub fn sort_groups(&self, group_map: &GroupMap) -> Vec<String> {
        self.sort_names(group_map.keys())
    }

    pub fn sort_names<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keyed: Vec<(usize, String, String)> = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                (self.rank(name), name.to_uppercase(), name.to_string())
            })
            .collect();

        keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| collate(&a.1, &b.1)));
        keyed.into_iter().map(|(_, _, name)| name).collect()
    }
}

/// Compare with Latin diacritics folded onto their base letter, then by
/// code point so distinct names never compare equal.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(fold_diacritic)
        .cmp(b.chars().map(fold_diacritic))
        .then_with(|| a.cmp(b))
}

fn fold_diacritic(c: char) -> char {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'A',
        'Ç' | 'ç' => 'C',
        'È' | 'É' | 'Ê' | 'Ë' | 'è' | 'é' | 'ê' | 'ë' => 'E',
        'Ğ' | 'ğ' => 'G',
        'Ì' | 'Í' | 'Î' | 'Ï' | 'İ' | 'ì' | 'í' | 'î' | 'ï' | 'ı' => 'I',
        'Ñ' | 'ñ' => 'N',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'O',
        'Ş' | 'ş' => 'S',
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'ù' | 'ú' | 'û' | 'ü' => 'U',
        'Ý' | 'Ÿ' | 'ý' | 'ÿ' => 'Y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Channel;

    fn map(names: &[&str]) -> GroupMap {
        names
            .iter()
            .map(|n| (n.to_string(), Vec::<Channel>::new()))
            .collect()
    }

    #[test]
    fn test_rank_then_alphabetical() {
        let ranker = GroupRanker::default();
        let sorted = ranker.sort_groups(&map(&["ZEBRA", "TR SPOR", "ULUSAL HABER"]));
        assert_eq!(sorted, vec!["ULUSAL HABER", "TR SPOR", "ZEBRA"]);
    }

    #[test]
    fn test_rank_uses_first_matching_marker() {
        let ranker = GroupRanker::default();
        assert_eq!(ranker.rank("ulusal"), 0);
        assert_eq!(ranker.rank("TR SPOR"), 3);
        assert_eq!(ranker.rank("SPOR"), 6);
        assert_eq!(ranker.rank("MOVIES"), UNRANKED);
    }

    #[test]
    fn test_unmatched_groups_collate() {
        let ranker = GroupRanker::new(Vec::<String>::new());
        let sorted = ranker.sort_names(["ÇOCUK", "DIZI", "CINEMA", "ZEBRA", "AKSIYON"]);
        assert_eq!(sorted, vec!["AKSIYON", "CINEMA", "ÇOCUK", "DIZI", "ZEBRA"]);
    }

    #[test]
    fn test_equal_rank_ties_break_by_name() {
        let ranker = GroupRanker::new(["SPOR"]);
        let sorted = ranker.sort_names(["SPOR B", "spor a", "NEWS"]);
        assert_eq!(sorted, vec!["spor a", "SPOR B", "NEWS"]);
    }

    #[test]
    fn test_collate_total_order() {
        assert_eq!(collate("ÇA", "CB"), Ordering::Less);
        assert_eq!(collate("CA", "ÇA"), Ordering::Less);
        assert_eq!(collate("SAME", "SAME"), Ordering::Equal);
    }
}
