//! Dialogue session state.

use game_world::NpcId;

use crate::document::Choice;

/// A key press, already mapped from the raw key by [`crate::KeyBindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Up,
    Down,
    Confirm,
    Cancel,
    /// Any key the dialogue does not react to.
    Other,
}

/// Why a dialogue was opened. Decides what happens when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialoguePurpose {
    /// Plain NPC chatter outside of any event.
    #[default]
    Ambient,
    /// A dialogue step of the running event.
    Script,
    /// A role-assignment prompt.
    AssignRoles,
}

/// What the owner of the dialogue should do once it has closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Nothing,
    /// Hand control back to the event interpreter.
    Script,
}

impl DialoguePurpose {
    /// The resumption owed when a dialogue with this purpose closes.
    pub fn resume(self) -> Resume {
        match self {
            DialoguePurpose::Script => Resume::Script,
            DialoguePurpose::Ambient | DialoguePurpose::AssignRoles => Resume::Nothing,
        }
    }
}

impl Resume {
    /// The purpose a follow-up dialogue needs to owe the same resumption.
    pub fn purpose(self) -> DialoguePurpose {
        match self {
            Resume::Script => DialoguePurpose::Script,
            Resume::Nothing => DialoguePurpose::Ambient,
        }
    }
}

/// Context stored alongside a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DialogueContext {
    pub purpose: DialoguePurpose,
    /// The NPC being talked to, if any.
    pub npc_id: Option<NpcId>,
}

impl DialogueContext {
    pub fn ambient(npc_id: Option<NpcId>) -> Self {
        Self {
            purpose: DialoguePurpose::Ambient,
            npc_id,
        }
    }

    pub fn script(npc_id: Option<NpcId>) -> Self {
        Self {
            purpose: DialoguePurpose::Script,
            npc_id,
        }
    }

    pub fn assign_roles() -> Self {
        Self {
            purpose: DialoguePurpose::AssignRoles,
            npc_id: None,
        }
    }
}

/// An open conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSession {
    pub speaker: String,
    /// Never empty.
    pub lines: Vec<String>,
    /// Page being shown. Only moves forward while the session is open.
    pub line_index: usize,
    pub options: Vec<Choice>,
    pub selected: usize,
    pub context: DialogueContext,
}

impl DialogueSession {
    /// The page currently on screen.
    pub fn current_line(&self) -> &str {
        self.lines.get(self.line_index).map_or("", String::as_str)
    }

    /// True when confirm would turn the page rather than close.
    pub fn has_next_line(&self) -> bool {
        self.line_index + 1 < self.lines.len()
    }

    /// Move the option cursor, wrapping around. No-op without options.
    pub fn move_selection(&mut self, forward: bool) {
        let count = self.options.len();
        if count == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % count
        } else {
            (self.selected + count - 1) % count
        };
    }

    /// The option under the cursor.
    pub fn selected_choice(&self) -> Option<&Choice> {
        self.options.get(self.selected)
    }
}

/// One option as it should be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub text: String,
    pub selected: bool,
}

/// Snapshot of an open dialogue for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueView {
    pub speaker: String,
    pub text: String,
    pub options: Vec<OptionView>,
    pub hint: String,
}
