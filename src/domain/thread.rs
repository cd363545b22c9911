use serde::Serialize;
use std::collections::HashMap;

use super::comment::{Comment, CommentId};

/// A root comment and its direct replies, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thread {
    pub root: Comment,
    pub replies: Vec<Comment>,
}

/// Group a flat comment list into one-level threads.
///
/// Roots and replies are both ordered by `created_at` ascending; ties keep
/// their input order. Replies whose parent is not among the roots are
/// dropped.
pub fn build_threads(comments: Vec<Comment>) -> Vec<Thread> {
    let (mut roots, replies): (Vec<Comment>, Vec<Comment>) =
        comments.into_iter().partition(|c| !c.is_reply());

    roots.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let mut by_parent: HashMap<CommentId, Vec<Comment>> = HashMap::new();
    for reply in replies {
        if let Some(parent) = reply.parent_comment_id.clone() {
            by_parent.entry(parent).or_default().push(reply);
        }
    }

    let threads: Vec<Thread> = roots
        .into_iter()
        .map(|root| {
            let mut replies = by_parent.remove(&root.id).unwrap_or_default();
            replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Thread { root, replies }
        })
        .collect();

    for (parent, orphans) in &by_parent {
        tracing::debug!(
            "Dropping {} reply(ies) to missing parent {}",
            orphans.len(),
            parent
        );
    }

    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PageUrl;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 8, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn comment(id: &str, parent: Option<&str>, created_at: DateTime<Utc>) -> Comment {
        Comment {
            id: id.into(),
            name: "Alice".to_string(),
            text: format!("comment {id}"),
            created_at,
            url: PageUrl::normalize("/articles/ddd"),
            approved: true,
            parent_comment_id: parent.map(CommentId::from),
        }
    }

    fn ids(comments: &[Comment]) -> Vec<&str> {
        comments.iter().map(|c| c.id.0.as_str()).collect()
    }

    #[test]
    fn single_root_with_reply() {
        let threads = build_threads(vec![
            comment("1", None, t(1)),
            comment("2", Some("1"), t(2)),
        ]);

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].root.id, "1".into());
        assert_eq!(ids(&threads[0].replies), vec!["2"]);
    }

    #[test]
    fn orders_roots_and_replies_chronologically() {
        let threads = build_threads(vec![
            comment("late-root", None, t(30)),
            comment("r2", Some("early-root"), t(20)),
            comment("early-root", None, t(0)),
            comment("r1", Some("early-root"), t(10)),
            comment("r3", Some("late-root"), t(40)),
        ]);

        let roots: Vec<&str> = threads.iter().map(|th| th.root.id.0.as_str()).collect();
        assert_eq!(roots, vec!["early-root", "late-root"]);
        assert_eq!(ids(&threads[0].replies), vec!["r1", "r2"]);
        assert_eq!(ids(&threads[1].replies), vec!["r3"]);
    }

    #[test]
    fn drops_orphaned_replies() {
        let threads = build_threads(vec![
            comment("1", None, t(0)),
            comment("orphan", Some("gone"), t(1)),
        ]);

        assert_eq!(threads.len(), 1);
        assert!(threads[0].replies.is_empty());
    }

    #[test]
    fn reply_to_a_reply_is_not_attached() {
        let threads = build_threads(vec![
            comment("1", None, t(0)),
            comment("2", Some("1"), t(1)),
            comment("3", Some("2"), t(2)),
        ]);

        assert_eq!(threads.len(), 1);
        assert_eq!(ids(&threads[0].replies), vec!["2"]);
    }

    #[test]
    fn every_comment_appears_at_most_once() {
        let input = vec![
            comment("a", None, t(5)),
            comment("b", None, t(1)),
            comment("c", Some("a"), t(2)),
            comment("d", Some("b"), t(3)),
            comment("e", Some("a"), t(0)),
        ];
        let threads = build_threads(input);

        let mut seen: Vec<&str> = Vec::new();
        for thread in &threads {
            seen.push(thread.root.id.0.as_str());
            seen.extend(ids(&thread.replies));
        }
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn empty_input_gives_no_threads() {
        assert!(build_threads(Vec::new()).is_empty());
    }
}
