//! Document construction for each view kind. Text here is a plain summary;
//! the host UI decides final presentation. What matters is that every
//! drillable line carries its entity tag.

use crate::cache::BuilderCache;
use crate::model::{Build, Change, ChangeInfo, Log, RevisionInfo, Step};
use crate::nav::{Document, Element, EntityTag};

fn short_rev(revision: &str) -> &str {
    // Truncate on a char boundary; revision ids are not guaranteed ASCII.
    revision
        .char_indices()
        .nth(10)
        .map_or(revision, |(i, _)| &revision[..i])
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn build_line(build: &Build, builders: &BuilderCache) -> String {
    format!(
        "  [{}] {} #{} - {}",
        build.status.label(),
        builders.name_of(build.builder_id),
        build.build_id,
        build.state_string
    )
}

pub fn branch(name: &str, changes: &[Change], builders: &BuilderCache) -> Document {
    let mut doc = Document::new(format!("branch {name}"));
    if changes.is_empty() {
        doc.push(Element::plain("no recent changes"));
        return doc;
    }
    for change in changes {
        doc.push(Element::tagged(
            format!(
                "{} {} {}",
                short_rev(&change.revision),
                change.author,
                first_line(&change.comments)
            ),
            EntityTag::Revision(change.revision.clone()),
        ));
        for build in change.builds.as_deref().unwrap_or_default() {
            doc.push(Element::tagged(
                build_line(build, builders),
                EntityTag::Build(Box::new(build.clone())),
            ));
        }
    }
    doc
}

pub fn revision(info: &RevisionInfo, groups: &[ChangeInfo], builders: &BuilderCache) -> Document {
    let mut doc = Document::new(format!("revision {}", info.revision));
    doc.push(Element::plain(format!("author: {}", info.author)));
    doc.push(Element::plain(format!(
        "date: {}",
        info.created_at.format("%Y-%m-%d %H:%M UTC")
    )));
    doc.push(Element::plain(first_line(&info.comments)));
    if groups.is_empty() {
        doc.push(Element::plain("no builds recorded"));
    }
    for group in groups {
        doc.push(Element::tagged(
            format!(
                "branch {} ({} ok, {} failed, {} pending)",
                group.branch, group.stats.success, group.stats.failure, group.stats.pending
            ),
            EntityTag::Branch(group.branch.clone()),
        ));
        for build in &group.builds {
            doc.push(Element::tagged(
                build_line(build, builders),
                EntityTag::Build(Box::new(build.clone())),
            ));
        }
    }
    doc
}

pub fn build(build: &Build, steps: &[Step], builders: &BuilderCache) -> Document {
    let mut doc = Document::new(format!(
        "build #{} on {}",
        build.build_id,
        builders.name_of(build.builder_id)
    ));
    doc.push(Element::plain(format!(
        "[{}] {}",
        build.status.label(),
        build.state_string
    )));
    for failed in &build.failed_tests {
        doc.push(Element::plain(format!("  failed: {}", failed.test_name)));
    }
    for step in steps {
        doc.push(Element::tagged(
            format!(
                "  {}. {} [{}] {}",
                step.number,
                step.name,
                step.status.label(),
                step.state_string
            ),
            EntityTag::Step(step.clone()),
        ));
    }
    doc
}

pub fn step(step: &Step, logs: &[Log]) -> Document {
    let mut doc = Document::new(format!("step {} - {}", step.number, step.name));
    doc.push(Element::plain(format!(
        "[{}] {}",
        step.status.label(),
        step.state_string
    )));
    if logs.is_empty() {
        doc.push(Element::plain("no logs"));
    }
    for log in logs {
        doc.push(Element::tagged(
            format!("  log: {}", log.name),
            EntityTag::Log(log.clone()),
        ));
    }
    doc
}

/// Terminal view: raw text, no tags to drill into.
pub fn log(name: &str, content: &str) -> Document {
    let mut doc = Document::new(format!("log {name}"));
    for line in content.lines() {
        doc.push(Element::plain(line));
    }
    doc
}

/// Builder overview handed out by the session as a one-shot listing.
pub fn builder_builds(name: &str, builds: &[Build], builders: &BuilderCache) -> Document {
    let mut doc = Document::new(format!("builder {name}"));
    if builds.is_empty() {
        doc.push(Element::plain("no recent builds"));
    }
    for b in builds {
        doc.push(Element::tagged(
            build_line(b, builders),
            EntityTag::Build(Box::new(b.clone())),
        ));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildStats, Status};

    fn cached_builders() -> BuilderCache {
        let mut cache = BuilderCache::new();
        cache.load(vec![crate::model::Builder {
            builder_id: 3,
            name: "linux-x86".to_string(),
        }]);
        cache
    }

    fn sample_build(id: u64, builder_id: u64) -> Build {
        Build {
            build_id: id,
            builder_id,
            state_string: "build successful".to_string(),
            failed_tests: Vec::new(),
            status: Status::Success,
        }
    }

    #[test]
    fn revision_shorthand_respects_char_boundaries() {
        assert_eq!(short_rev("deadbeefcafe"), "deadbeefca");
        assert_eq!(short_rev("短い"), "短い");
        assert_eq!(short_rev("日本語の改訂版テスト拡張"), "日本語の改訂版テスト");
    }

    #[test]
    fn branch_document_tags_changes_and_builds() {
        let change = Change {
            change_id: 1,
            revision: "deadbeefcafe".to_string(),
            branch: "main".to_string(),
            author: "dev".to_string(),
            when_timestamp: 0,
            comments: "change\nbody".to_string(),
            builds: Some(vec![sample_build(7, 3)]),
        };
        let doc = branch("main", &[change], &cached_builders());
        assert_eq!(doc.title, "branch main");
        let tags: Vec<_> = doc.tags().collect();
        assert_eq!(tags.len(), 2);
        assert!(matches!(tags[0], EntityTag::Revision(r) if r == "deadbeefcafe"));
        assert!(matches!(tags[1], EntityTag::Build(b) if b.build_id == 7));
        // Revision line shows only the comment's first line and a short hash.
        assert!(doc.elements[0].text.contains("deadbeefca"));
        assert!(!doc.elements[0].text.contains("body"));
    }

    #[test]
    fn revision_document_shows_stats_and_resolved_names() {
        let info = RevisionInfo::empty("cafe");
        let group = ChangeInfo {
            branch: "main".to_string(),
            stats: BuildStats {
                success: 1,
                failure: 0,
                pending: 0,
            },
            builds: vec![sample_build(9, 3)],
        };
        let doc = revision(&info, &[group], &cached_builders());
        let branch_line = &doc.elements[3].text;
        assert!(branch_line.contains("1 ok"));
        let build_line = &doc.elements[4].text;
        assert!(build_line.contains("linux-x86"));
    }

    #[test]
    fn unknown_builder_degrades_to_sentinel() {
        let doc = build(&sample_build(5, 99), &[], &cached_builders());
        assert!(doc.title.contains("unknown builder"));
    }

    #[test]
    fn log_document_is_terminal() {
        let doc = log("stdio", "a\nb\nc");
        assert_eq!(doc.elements.len(), 3);
        assert_eq!(doc.tags().count(), 0);
    }

    #[test]
    fn step_document_tags_logs() {
        let s = Step {
            step_id: 2,
            number: 1,
            name: "compile".to_string(),
            state_string: "done".to_string(),
            status: Status::Other,
        };
        let logs = vec![Log {
            log_id: 4,
            name: "stdio".to_string(),
        }];
        let doc = step(&s, &logs);
        assert!(matches!(doc.tags().next(), Some(EntityTag::Log(l)) if l.log_id == 4));
    }
}
