use crate::error::InkError;
use crate::path::{InkPath, PathComponent};

/// Handle to an immutable node of the compiled story graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Container,
    Text,
    Glue,
    Control,
    ChoicePoint,
    Divert,
    Other,
}

/// Read-only view of the compiled story. Implemented by whatever owns the
/// loaded story; the runtime state only ever holds handles into it.
pub trait StoryGraph: Send + Sync {
    fn root_container(&self) -> ContentId;

    fn main_container(&self) -> ContentId {
        self.root_container()
    }

    fn resolve_path(&self, path: &InkPath) -> Result<ContentId, InkError>;

    fn path_of(&self, id: ContentId) -> InkPath;

    fn kind_of(&self, id: ContentId) -> ContentKind;

    fn parent_of(&self, id: ContentId) -> Option<ContentId>;

    fn index_in_parent(&self, id: ContentId) -> Option<usize>;

    fn content_at(&self, container: ContentId, index: usize) -> Option<ContentId>;
}

#[derive(Debug, Clone)]
struct ContentNode {
    name: Option<String>,
    kind: ContentKind,
    parent: Option<ContentId>,
    children: Vec<ContentId>,
}

/// Arena-backed `StoryGraph`: nodes are appended once and addressed by
/// `ContentId` afterwards.
#[derive(Debug, Clone)]
pub struct ContentArena {
    nodes: Vec<ContentNode>,
    main: Option<ContentId>,
}

impl Default for ContentArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentArena {
    pub fn new() -> Self {
        Self {
            nodes: vec![ContentNode {
                name: None,
                kind: ContentKind::Container,
                parent: None,
                children: Vec::new(),
            }],
            main: None,
        }
    }

    pub fn root(&self) -> ContentId {
        ContentId(0)
    }

    pub fn add_container(&mut self, parent: ContentId, name: Option<&str>) -> ContentId {
        self.push_node(parent, name, ContentKind::Container)
    }

    pub fn add_content(&mut self, parent: ContentId, kind: ContentKind) -> ContentId {
        self.push_node(parent, None, kind)
    }

    pub fn set_main(&mut self, id: ContentId) {
        self.main = Some(id);
    }

    pub fn children(&self, id: ContentId) -> &[ContentId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    fn push_node(&mut self, parent: ContentId, name: Option<&str>, kind: ContentKind) -> ContentId {
        let id = ContentId(self.nodes.len() as u32);
        self.nodes.push(ContentNode {
            name: name.map(str::to_string),
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent_node) = self.nodes.get_mut(parent.0 as usize) {
            parent_node.children.push(id);
        }
        id
    }

    fn node(&self, id: ContentId) -> Option<&ContentNode> {
        self.nodes.get(id.0 as usize)
    }

    fn unresolved(path: &InkPath) -> InkError {
        InkError::new(
            "PATH_UNRESOLVED",
            format!("Path \"{}\" does not resolve to story content.", path),
        )
    }
}

impl StoryGraph for ContentArena {
    fn root_container(&self) -> ContentId {
        self.root()
    }

    fn main_container(&self) -> ContentId {
        self.main.unwrap_or_else(|| self.root())
    }

    fn resolve_path(&self, path: &InkPath) -> Result<ContentId, InkError> {
        if path.is_relative() {
            return Err(InkError::new(
                "PATH_INVALID",
                format!("Relative path \"{}\" cannot be resolved globally.", path),
            ));
        }

        let mut current = self.root();
        for component in path.components() {
            let next = match component {
                PathComponent::Parent => self.parent_of(current),
                PathComponent::Index(index) => self.content_at(current, *index),
                PathComponent::Name(name) => self
                    .children(current)
                    .iter()
                    .copied()
                    .find(|child| {
                        self.node(*child)
                            .and_then(|node| node.name.as_deref())
                            .is_some_and(|child_name| child_name == name)
                    }),
            };
            current = next.ok_or_else(|| Self::unresolved(path))?;
        }
        Ok(current)
    }

    fn path_of(&self, id: ContentId) -> InkPath {
        let mut components = Vec::new();
        let mut current = id;
        while let Some(node) = self.node(current) {
            let Some(parent) = node.parent else {
                break;
            };
            let component = match &node.name {
                Some(name) => PathComponent::Name(name.clone()),
                None => PathComponent::Index(self.index_in_parent(current).unwrap_or(0)),
            };
            components.push(component);
            current = parent;
        }
        components.reverse();
        InkPath::from_components(components)
    }

    fn kind_of(&self, id: ContentId) -> ContentKind {
        self.node(id)
            .map(|node| node.kind)
            .unwrap_or(ContentKind::Other)
    }

    fn parent_of(&self, id: ContentId) -> Option<ContentId> {
        self.node(id).and_then(|node| node.parent)
    }

    fn index_in_parent(&self, id: ContentId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    fn content_at(&self, container: ContentId, index: usize) -> Option<ContentId> {
        self.children(container).get(index).copied()
    }
}
