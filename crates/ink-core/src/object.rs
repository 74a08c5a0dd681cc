use crate::graph::ContentId;
use crate::path::InkPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
}

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn newline() -> Self {
        Self::new("\n")
    }

    pub fn is_newline(&self) -> bool {
        self.value == "\n"
    }

    pub fn is_non_whitespace(&self) -> bool {
        self.value.chars().any(|c| !is_spacing_or_newline(c))
    }
}

fn is_spacing_or_newline(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlueKind {
    Left,
    Right,
    Bidirectional,
}

impl GlueKind {
    pub fn token(self) -> &'static str {
        match self {
            Self::Left => "G<",
            Self::Right => "G>",
            Self::Bidirectional => "<>",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "G<" => Some(Self::Left),
            "G>" => Some(Self::Right),
            "<>" => Some(Self::Bidirectional),
            _ => None,
        }
    }
}

/// Zero-width joiner. `parent` is the compiled container the glue was
/// generated for; left and right glue only pair up within one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glue {
    pub kind: GlueKind,
    pub parent: Option<ContentId>,
}

impl Glue {
    pub fn new(kind: GlueKind) -> Self {
        Self { kind, parent: None }
    }

    pub fn with_parent(kind: GlueKind, parent: ContentId) -> Self {
        Self {
            kind,
            parent: Some(parent),
        }
    }

    pub fn is_left(&self) -> bool {
        self.kind == GlueKind::Left
    }

    pub fn is_right(&self) -> bool {
        self.kind == GlueKind::Right
    }

    pub fn is_bi(&self) -> bool {
        self.kind == GlueKind::Bidirectional
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    EvalStart,
    EvalOutput,
    EvalEnd,
    Duplicate,
    PopEvaluatedValue,
    PopFunction,
    PopTunnel,
    BeginString,
    EndString,
    NoOp,
    ChoiceCount,
    TurnsSince,
    VisitIndex,
    SequenceShuffleIndex,
    StartThread,
    Done,
    End,
}

impl ControlCommand {
    pub const ALL: [ControlCommand; 17] = [
        Self::EvalStart,
        Self::EvalOutput,
        Self::EvalEnd,
        Self::Duplicate,
        Self::PopEvaluatedValue,
        Self::PopFunction,
        Self::PopTunnel,
        Self::BeginString,
        Self::EndString,
        Self::NoOp,
        Self::ChoiceCount,
        Self::TurnsSince,
        Self::VisitIndex,
        Self::SequenceShuffleIndex,
        Self::StartThread,
        Self::Done,
        Self::End,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::EvalStart => "ev",
            Self::EvalOutput => "out",
            Self::EvalEnd => "/ev",
            Self::Duplicate => "du",
            Self::PopEvaluatedValue => "pop",
            Self::PopFunction => "~ret",
            Self::PopTunnel => "->->",
            Self::BeginString => "str",
            Self::EndString => "/str",
            Self::NoOp => "nop",
            Self::ChoiceCount => "choiceCnt",
            Self::TurnsSince => "turns",
            Self::VisitIndex => "visit",
            Self::SequenceShuffleIndex => "seq",
            Self::StartThread => "thread",
            Self::Done => "done",
            Self::End => "end",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePointer {
    pub name: String,
    /// -1 unknown, 0 global, 1+ call frame index + 1.
    pub context_index: i32,
}

impl VariablePointer {
    pub fn new(name: impl Into<String>, context_index: i32) -> Self {
        Self {
            name: name.into(),
            context_index,
        }
    }
}

/// Everything that can sit on the evaluation stack or in the output stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeObject {
    Text(Text),
    Int(i32),
    Float(f64),
    Glue(Glue),
    Control(ControlCommand),
    DivertTarget(InkPath),
    VariablePointer(VariablePointer),
    Content(ContentId),
    Void,
}

impl RuntimeObject {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Text::new(value))
    }

    pub fn glue(kind: GlueKind) -> Self {
        Self::Glue(Glue::new(kind))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_glue(&self) -> Option<&Glue> {
        match self {
            Self::Glue(glue) => Some(glue),
            _ => None,
        }
    }

}
