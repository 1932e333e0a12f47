//! Property-based tests for the interpreter and role assignment.
//!
//! These tests verify talk-block order independence and capacity
//! conservation over generated documents.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use serde_json::json;

use event_script::{
    Action, AssignRolesStep, AssignmentLedger, EngineConfig, EventDocument, EventInterpreter,
    InputEvent, RoleAssignmentController, RoleProgress,
};
use game_world::{GameState, NpcId, Overworld, TilePos};

/// Talk block over `n` NPCs, each talk raising a flag, then one role
/// assignment covering all of them in document order.
fn talk_block_document(n: usize) -> EventDocument {
    let mut steps: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            json!({
                "type": "dialogue",
                "trigger": "talk",
                "npc_id": format!("npc{}", i),
                "speaker": format!("Villager {}", i),
                "lines": ["hello"],
                "post": [{"type": "set_flag", "flag": format!("talked_npc{}", i)}]
            })
        })
        .collect();

    steps.push(json!({
        "type": "assign_roles",
        "npcs": (0..n).map(|i| format!("npc{}", i)).collect::<Vec<_>>(),
        "roles": ["soldier", "advisor"],
        "constraints": {"soldier": 2, "advisor": n}
    }));
    steps.push(json!({"type": "set_flag", "flag": "block_done"}));

    EventDocument::from_value(json!({"once_flag": "block_event", "steps": steps})).unwrap()
}

fn world(n: usize) -> Overworld {
    (0..n).fold(Overworld::new(GameState::new()), |world, i| {
        world.with_npc(format!("npc{}", i), TilePos::new(i as i32, 0))
    })
}

/// Talk to the NPCs in `order`, then accept the first offered role for
/// everyone. Returns the final ledger and world.
fn run_block(order: &[usize]) -> (EventInterpreter, Overworld) {
    let n = order.len();
    let doc = talk_block_document(n);
    let mut world = world(n);
    let mut interpreter = EventInterpreter::default();

    assert!(interpreter.start(&mut world, &doc));
    for &i in order {
        let npc = NpcId::new(format!("npc{}", i));
        assert!(interpreter.on_player_interact(&mut world, &npc));
        assert!(interpreter.handle_input(&mut world, InputEvent::Confirm));
    }
    while interpreter.roles().is_active() {
        assert!(interpreter.handle_input(&mut world, InputEvent::Confirm));
    }

    (interpreter, world)
}

fn permutation() -> impl Strategy<Value = Vec<usize>> {
    (1usize..6).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any talk order ends in the same assignments and terminal state.
    #[test]
    fn prop_talk_block_order_independent(order in permutation()) {
        let in_order: Vec<usize> = (0..order.len()).collect();

        let (shuffled, shuffled_world) = run_block(&order);
        let (reference, reference_world) = run_block(&in_order);

        prop_assert!(!shuffled.is_active());
        prop_assert!(shuffled.waiting().is_none());
        prop_assert_eq!(shuffled.cursor(), reference.cursor());
        prop_assert_eq!(shuffled.assignments().to_map(), reference.assignments().to_map());
        prop_assert_eq!(&shuffled_world.state.story_flags, &reference_world.state.story_flags);
        prop_assert!(shuffled_world.state.flag("block_done"));
        prop_assert!(shuffled_world.state.flag("block_event"));
        prop_assert!(!shuffled_world.input_locked);
    }

    /// Roles never go over capacity unless every role ran out at once.
    #[test]
    fn prop_capacity_conservation(
        capacities in prop::collection::vec(-1i64..4, 1..5),
        npc_count in 0usize..8,
        picks in prop::collection::vec(any::<usize>(), 8)
    ) {
        let roles: Vec<String> = (0..capacities.len()).map(|i| format!("role{}", i)).collect();
        let step = AssignRolesStep {
            npcs: (0..npc_count).map(|i| NpcId::new(format!("npc{}", i))).collect(),
            roles: roles.clone(),
            constraints: roles.iter().cloned().zip(capacities.iter().copied()).collect(),
            ..Default::default()
        };

        let config = EngineConfig::default();
        let mut world = Overworld::new(GameState::new());
        let mut ledger = AssignmentLedger::new();
        let mut controller = RoleAssignmentController::new();
        let mut fallback = false;

        let mut progress = controller.start(step.npcs.clone(), &step, &ledger, &config);
        let mut turn = 0;
        let local = loop {
            match progress {
                RoleProgress::Prompt(prompt) => {
                    prop_assert!(!prompt.options.is_empty());
                    if roles.iter().all(|r| controller.remaining_for(r) == 0) {
                        fallback = true;
                    }

                    let choice = &prompt.options[picks[turn] % prompt.options.len()];
                    let Action::AssignRole(role) = &choice.action else {
                        panic!("role prompt offered {:?}", choice.action);
                    };
                    turn += 1;
                    progress = controller.assign(role, &mut ledger, &mut world, None, &config);
                }
                RoleProgress::Finished(local) => break local,
                RoleProgress::Idle => panic!("controller went idle mid-sequence"),
            }
        };

        prop_assert_eq!(local.len(), npc_count);
        prop_assert_eq!(ledger.len(), npc_count);
        if !fallback {
            for (role, capacity) in roles.iter().zip(&capacities) {
                prop_assert!(ledger.count_role(role) as i64 <= (*capacity).max(0));
            }
        }
    }
}
