//! Dialogue controller - the modal text/options box.
//!
//! The controller owns at most one [`DialogueSession`]. Key presses move
//! through pages or options; confirming an option yields a
//! [`DialogueSignal`] the owner acts on. Closing never calls back into the
//! owner: [`DialogueController::close`] returns a [`Resume`] token instead, so
//! the owner can open the next dialogue without racing the reset.

mod session;

pub use session::*;

use game_world::NpcId;

use crate::config::DialogueHints;
use crate::document::{Action, Choice};

/// Text shown when a dialogue is opened without lines.
pub const PLACEHOLDER_LINE: &str = "...";

/// Result of an input or a confirmed option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueSignal {
    /// Input was swallowed; nothing for the owner to do.
    Consumed,
    /// The dialogue closed.
    Closed(Resume),
    /// The dialogue closed and the running event should advance.
    Continue(Resume),
    /// The player picked a role for the NPC being prompted. The dialogue
    /// stays open.
    AssignRole(String),
    /// Cancel was pressed on a mandatory role prompt: skip this NPC.
    SkipAssignment,
    /// The player accepted a recruit offer. The dialogue has closed.
    Recruit {
        unit_id: String,
        speaker: String,
        npc_id: Option<NpcId>,
        resume: Resume,
    },
}

/// Owns the current dialogue session.
#[derive(Debug, Clone)]
pub struct DialogueController {
    session: Option<DialogueSession>,
    placeholder_line: String,
}

impl Default for DialogueController {
    fn default() -> Self {
        Self::new(PLACEHOLDER_LINE)
    }
}

impl DialogueController {
    /// Create a controller that shows `placeholder_line` for empty dialogues.
    pub fn new(placeholder_line: impl Into<String>) -> Self {
        Self {
            session: None,
            placeholder_line: placeholder_line.into(),
        }
    }

    /// Open a dialogue, replacing any open one.
    pub fn open(
        &mut self,
        speaker: impl Into<String>,
        lines: Vec<String>,
        options: Vec<Choice>,
        context: DialogueContext,
    ) {
        let lines = if lines.is_empty() {
            vec![self.placeholder_line.clone()]
        } else {
            lines
        };

        self.session = Some(DialogueSession {
            speaker: speaker.into(),
            lines,
            line_index: 0,
            options,
            selected: 0,
            context,
        });
    }

    /// Whether a dialogue is open.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The open session.
    pub fn session(&self) -> Option<&DialogueSession> {
        self.session.as_ref()
    }

    /// Handle a key press.
    ///
    /// Returns `None` when no dialogue is open, so the caller can use the
    /// input for something else. While a dialogue is open every input is
    /// consumed.
    ///
    /// `assignment_in_progress` tells whether a role-assignment sequence is
    /// mid-way; cancel on its prompt then skips the NPC instead of closing.
    pub fn handle_input(
        &mut self,
        input: InputEvent,
        assignment_in_progress: bool,
    ) -> Option<DialogueSignal> {
        let session = self.session.as_mut()?;

        if input == InputEvent::Cancel {
            if session.context.purpose == DialoguePurpose::AssignRoles && assignment_in_progress {
                return Some(DialogueSignal::SkipAssignment);
            }
            return Some(DialogueSignal::Closed(self.close()));
        }

        if !session.options.is_empty() {
            let signal = match input {
                InputEvent::Up => {
                    session.move_selection(false);
                    DialogueSignal::Consumed
                }
                InputEvent::Down => {
                    session.move_selection(true);
                    DialogueSignal::Consumed
                }
                InputEvent::Confirm => self.confirm(),
                InputEvent::Cancel | InputEvent::Other => DialogueSignal::Consumed,
            };
            return Some(signal);
        }

        if input == InputEvent::Confirm {
            if session.has_next_line() {
                session.line_index += 1;
                return Some(DialogueSignal::Consumed);
            }
            // A role prompt without options can only move on to the next NPC
            if session.context.purpose == DialoguePurpose::AssignRoles && assignment_in_progress {
                return Some(DialogueSignal::SkipAssignment);
            }
            return Some(DialogueSignal::Closed(self.close()));
        }

        Some(DialogueSignal::Consumed)
    }

    /// Resolve the option under the cursor.
    pub fn confirm(&mut self) -> DialogueSignal {
        let Some(session) = self.session.as_ref() else {
            return DialogueSignal::Consumed;
        };

        let Some(choice) = session.selected_choice() else {
            return DialogueSignal::Closed(self.close());
        };

        match choice.action.clone() {
            Action::EventContinue => DialogueSignal::Continue(self.close()),
            Action::AssignRole(role) => DialogueSignal::AssignRole(role),
            Action::Recruit { unit_id } => {
                let speaker = session.speaker.clone();
                let npc_id = session.context.npc_id.clone();
                let resume = self.close();
                DialogueSignal::Recruit {
                    unit_id,
                    speaker,
                    npc_id,
                    resume,
                }
            }
            Action::Close | Action::Unknown(_) => DialogueSignal::Closed(self.close()),
        }
    }

    /// Close the dialogue and report what the owner should resume.
    ///
    /// All session state is gone by the time the token is returned.
    pub fn close(&mut self) -> Resume {
        match self.session.take() {
            Some(session) => session.context.purpose.resume(),
            None => Resume::Nothing,
        }
    }

    /// Snapshot of the open dialogue for drawing.
    pub fn view(&self, hints: &DialogueHints) -> Option<DialogueView> {
        let session = self.session.as_ref()?;

        let options = session
            .options
            .iter()
            .enumerate()
            .map(|(i, choice)| OptionView {
                text: choice.text.clone(),
                selected: i == session.selected,
            })
            .collect();

        let hint = if session.options.is_empty() {
            hints.lines.clone()
        } else {
            hints.options.clone()
        };

        Some(DialogueView {
            speaker: session.speaker.clone(),
            text: session.current_line().to_string(),
            options,
            hint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn role_options() -> Vec<Choice> {
        vec![
            Choice::new("soldier", Action::AssignRole("soldier".to_string())),
            Choice::new("advisor", Action::AssignRole("advisor".to_string())),
        ]
    }

    #[test]
    fn test_input_without_session_is_not_consumed() {
        let mut dialogue = DialogueController::default();
        assert_eq!(dialogue.handle_input(InputEvent::Confirm, false), None);
    }

    #[test]
    fn test_empty_lines_get_placeholder() {
        let mut dialogue = DialogueController::default();
        dialogue.open("Marian", Vec::new(), Vec::new(), DialogueContext::default());

        let session = dialogue.session().unwrap();
        assert_eq!(session.lines, vec![PLACEHOLDER_LINE.to_string()]);
    }

    #[test]
    fn test_confirm_pages_then_closes() {
        let mut dialogue = DialogueController::default();
        dialogue.open(
            "A",
            lines(&["one", "two"]),
            Vec::new(),
            DialogueContext::script(None),
        );

        assert_eq!(
            dialogue.handle_input(InputEvent::Confirm, false),
            Some(DialogueSignal::Consumed)
        );
        assert_eq!(dialogue.session().unwrap().line_index, 1);

        assert_eq!(
            dialogue.handle_input(InputEvent::Confirm, false),
            Some(DialogueSignal::Closed(Resume::Script))
        );
        assert!(!dialogue.is_active());
    }

    #[test]
    fn test_line_index_never_goes_back() {
        let mut dialogue = DialogueController::default();
        dialogue.open("A", lines(&["1", "2", "3"]), Vec::new(), DialogueContext::default());

        let mut last = 0;
        for input in [
            InputEvent::Up,
            InputEvent::Confirm,
            InputEvent::Down,
            InputEvent::Other,
            InputEvent::Confirm,
        ] {
            dialogue.handle_input(input, false);
            let index = dialogue.session().unwrap().line_index;
            assert!(index >= last);
            last = index;
        }
        assert_eq!(last, 2);

        // Reopening starts from the first page
        dialogue.close();
        dialogue.open("A", lines(&["x", "y"]), Vec::new(), DialogueContext::default());
        assert_eq!(dialogue.session().unwrap().line_index, 0);
    }

    #[test]
    fn test_other_keys_are_swallowed() {
        let mut dialogue = DialogueController::default();
        dialogue.open("A", lines(&["only"]), Vec::new(), DialogueContext::default());

        assert_eq!(
            dialogue.handle_input(InputEvent::Up, false),
            Some(DialogueSignal::Consumed)
        );
        assert!(dialogue.is_active());
    }

    #[test]
    fn test_option_navigation_and_assign() {
        let mut dialogue = DialogueController::default();
        dialogue.open("Roles", lines(&["pick"]), role_options(), DialogueContext::assign_roles());

        dialogue.handle_input(InputEvent::Up, true);
        assert_eq!(dialogue.session().unwrap().selected, 1);

        assert_eq!(
            dialogue.handle_input(InputEvent::Confirm, true),
            Some(DialogueSignal::AssignRole("advisor".to_string()))
        );
        // Role prompts stay open until the role controller is done
        assert!(dialogue.is_active());
    }

    #[test]
    fn test_cancel_on_mandatory_prompt_skips() {
        let mut dialogue = DialogueController::default();
        dialogue.open("Roles", lines(&["pick"]), role_options(), DialogueContext::assign_roles());

        assert_eq!(
            dialogue.handle_input(InputEvent::Cancel, true),
            Some(DialogueSignal::SkipAssignment)
        );
        assert!(dialogue.is_active());

        // Without a running assignment the prompt just closes
        assert_eq!(
            dialogue.handle_input(InputEvent::Cancel, false),
            Some(DialogueSignal::Closed(Resume::Nothing))
        );
        assert!(!dialogue.is_active());
    }

    #[test]
    fn test_confirm_on_empty_role_prompt_skips() {
        let mut dialogue = DialogueController::default();
        dialogue.open("Roles", lines(&["pick", "left"]), Vec::new(), DialogueContext::assign_roles());

        assert_eq!(
            dialogue.handle_input(InputEvent::Confirm, true),
            Some(DialogueSignal::Consumed)
        );
        assert_eq!(
            dialogue.handle_input(InputEvent::Confirm, true),
            Some(DialogueSignal::SkipAssignment)
        );
        assert!(dialogue.is_active());
    }

    #[test]
    fn test_event_continue_closes() {
        let mut dialogue = DialogueController::default();
        dialogue.open(
            "A",
            lines(&["go?"]),
            vec![Choice::new("Go", Action::EventContinue)],
            DialogueContext::script(None),
        );

        assert_eq!(dialogue.confirm(), DialogueSignal::Continue(Resume::Script));
        assert!(!dialogue.is_active());
    }

    #[test]
    fn test_recruit_carries_speaker_and_npc() {
        let mut dialogue = DialogueController::default();
        dialogue.open(
            "Selma",
            lines(&["Take me with you"]),
            vec![Choice::new(
                "Recruit",
                Action::Recruit {
                    unit_id: "selma_ironrose".to_string(),
                },
            )],
            DialogueContext::ambient(Some(NpcId::from("selma_ironrose"))),
        );

        assert_eq!(
            dialogue.confirm(),
            DialogueSignal::Recruit {
                unit_id: "selma_ironrose".to_string(),
                speaker: "Selma".to_string(),
                npc_id: Some(NpcId::from("selma_ironrose")),
                resume: Resume::Nothing,
            }
        );
        assert!(!dialogue.is_active());
    }

    #[test]
    fn test_unknown_action_closes() {
        let mut dialogue = DialogueController::default();
        dialogue.open(
            "A",
            lines(&["?"]),
            vec![Choice::new("Dance", Action::Unknown("dance".to_string()))],
            DialogueContext::default(),
        );

        assert_eq!(dialogue.confirm(), DialogueSignal::Closed(Resume::Nothing));
    }

    #[test]
    fn test_close_without_session() {
        let mut dialogue = DialogueController::default();
        assert_eq!(dialogue.close(), Resume::Nothing);
        assert_eq!(dialogue.confirm(), DialogueSignal::Consumed);
    }

    #[test]
    fn test_view_marks_selection() {
        let mut dialogue = DialogueController::default();
        let hints = DialogueHints::default();
        assert!(dialogue.view(&hints).is_none());

        dialogue.open("Roles", lines(&["pick"]), role_options(), DialogueContext::assign_roles());
        dialogue.handle_input(InputEvent::Down, true);

        let view = dialogue.view(&hints).unwrap();
        assert_eq!(view.text, "pick");
        assert!(!view.options[0].selected);
        assert!(view.options[1].selected);
        assert_eq!(view.hint, hints.options);
    }
}
