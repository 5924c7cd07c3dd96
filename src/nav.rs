use std::fmt;

use crate::model::{Build, Log, RevisionInfo, Step};

/// The five view kinds. `Log` is terminal: a log document carries no tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Branch,
    Revision,
    Build,
    Step,
    Log,
}

/// View identity. Two opens with the same key address the same view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Branch(String),
    Revision(String),
    Build(u64),
    Step(u64),
    Log(u64),
}

impl ViewKey {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewKey::Branch(_) => ViewKind::Branch,
            ViewKey::Revision(_) => ViewKind::Revision,
            ViewKey::Build(_) => ViewKind::Build,
            ViewKey::Step(_) => ViewKind::Step,
            ViewKey::Log(_) => ViewKind::Log,
        }
    }
}

/// Drill-down payload attached to a rendered element. Explicit data, never
/// parsed back out of display text.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityTag {
    Branch(String),
    Revision(String),
    Build(Box<Build>),
    Step(Step),
    Log(Log),
}

impl EntityTag {
    /// Identity of the view this tag opens.
    pub fn key(&self) -> ViewKey {
        match self {
            EntityTag::Branch(branch) => ViewKey::Branch(branch.clone()),
            EntityTag::Revision(revision) => ViewKey::Revision(revision.clone()),
            EntityTag::Build(build) => ViewKey::Build(build.build_id),
            EntityTag::Step(step) => ViewKey::Step(step.step_id),
            EntityTag::Log(log) => ViewKey::Log(log.log_id),
        }
    }
}

/// Ancestor context carried into a view. Each open view owns its own copy;
/// nothing here is shared between views.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub branch: Option<String>,
    pub revision: Option<RevisionInfo>,
    pub build: Option<Build>,
    pub step: Option<Step>,
    pub log: Option<Log>,
}

impl ViewContext {
    /// Copy of this context with the field matching the tag's kind
    /// overwritten; every other ancestor field is inherited as-is.
    pub fn with_tag(&self, tag: &EntityTag) -> ViewContext {
        let mut ctx = self.clone();
        match tag {
            EntityTag::Branch(branch) => ctx.branch = Some(branch.clone()),
            EntityTag::Revision(revision) => {
                // Only the id is known until the revision view resolves.
                ctx.revision = Some(RevisionInfo {
                    revision: revision.clone(),
                    ..RevisionInfo::default()
                });
            }
            EntityTag::Build(build) => ctx.build = Some((**build).clone()),
            EntityTag::Step(step) => ctx.step = Some(step.clone()),
            EntityTag::Log(log) => ctx.log = Some(log.clone()),
        }
        ctx
    }
}

/// One renderable unit plus the identity needed to open the next view.
#[derive(Debug, Clone)]
pub struct Element {
    pub text: String,
    pub tag: Option<EntityTag>,
}

impl Element {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
        }
    }

    pub fn tagged(text: impl Into<String>, tag: EntityTag) -> Self {
        Self {
            text: text.into(),
            tag: Some(tag),
        }
    }
}

/// What a resolved view hands to the host UI.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub title: String,
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Tags attached to this document's elements, in render order.
    pub fn tags(&self) -> impl Iterator<Item = &EntityTag> {
        self.elements.iter().filter_map(|e| e.tag.as_ref())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for element in &self.elements {
            writeln!(f, "{}", element.text)?;
        }
        Ok(())
    }
}

/// One open view: identity, owned ancestor context and rendered content.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub key: ViewKey,
    pub ctx: ViewContext,
    pub doc: Document,
}
