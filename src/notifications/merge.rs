use std::collections::{HashMap, HashSet};

use crate::schema::Notification;

/// Counts describing how a page changed the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub received: usize,
    pub added: usize,
    pub updated: usize,
}

/// Merge `incoming` into `existing`, keyed by id.
///
/// Order is the first appearance of each id across `existing ++ incoming`;
/// the value is the last appearance, so a re-fetched id carries the freshest
/// copy while keeping its position.
pub fn merge_notifications(
    existing: &[Notification],
    incoming: Vec<Notification>,
) -> (Vec<Notification>, MergeStats) {
    let known: HashSet<i64> = existing.iter().map(|n| n.id).collect();
    let mut stats = MergeStats {
        received: incoming.len(),
        ..MergeStats::default()
    };
    let mut seen_incoming = HashSet::new();
    for n in &incoming {
        if seen_incoming.insert(n.id) {
            if known.contains(&n.id) {
                stats.updated += 1;
            } else {
                stats.added += 1;
            }
        }
    }

    (dedup_last_wins(existing.iter().cloned().chain(incoming)), stats)
}

/// Collapse duplicate ids, keeping first position and last value.
pub fn dedup_last_wins(items: impl IntoIterator<Item = Notification>) -> Vec<Notification> {
    let mut order = Vec::new();
    let mut by_id: HashMap<i64, Notification> = HashMap::new();
    for item in items {
        let id = item.id;
        if by_id.insert(id, item).is_none() {
            order.push(id);
        }
    }
    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: i64, title: &str, is_read: bool) -> Notification {
        Notification {
            id,
            title: title.to_string(),
            message: "m".to_string(),
            time_created_iso: "2025-11-02T08:15:00Z".to_string(),
            is_read,
            link_post_id: None,
            reporter_user_id: 1,
            link_to_newpost: None,
        }
    }

    #[test]
    fn test_merge_appends_new_ids_in_order() {
        let existing = vec![note(1, "a", false), note(2, "b", false)];
        let (merged, stats) = merge_notifications(&existing, vec![note(3, "c", false), note(4, "d", true)]);

        let ids: Vec<i64> = merged.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(stats, MergeStats { received: 2, added: 2, updated: 0 });
    }

    #[test]
    fn test_merge_overwrites_repeated_id_in_place() {
        let existing = vec![note(1, "old", false), note(2, "b", false)];
        let (merged, stats) = merge_notifications(&existing, vec![note(1, "new", true), note(5, "e", false)]);

        let ids: Vec<i64> = merged.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 5]);
        assert_eq!(merged[0].title, "new");
        assert!(merged[0].is_read);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.added, 1);
    }

    #[test]
    fn test_duplicates_within_page_keep_last() {
        let merged = dedup_last_wins(vec![note(7, "first", false), note(8, "x", false), note(7, "second", false)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, 7);
        assert_eq!(merged[0].title, "second");
    }

    #[test]
    fn test_merge_into_empty() {
        let (merged, stats) = merge_notifications(&[], vec![]);
        assert!(merged.is_empty());
        assert_eq!(stats, MergeStats::default());
    }
}
