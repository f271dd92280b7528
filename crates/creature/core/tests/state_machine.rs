use creature_core::{
    AiTuning, CreatureMode, CreatureState, Health, TransitionInputs, TransitionRule, select_rule,
};
use strum::IntoEnumIterator;

fn every_input() -> Vec<TransitionInputs> {
    let mut all = Vec::new();
    for state in CreatureState::iter() {
        for mode in CreatureMode::iter() {
            for aware in [false, true] {
                for feared_distance in [1, 2, 3, 10] {
                    for current in [1, 10, 25, 50, 75, 100] {
                        for discordant in [false, true] {
                            for flees_near_death in [false, true] {
                                for magically_afraid in [false, true] {
                                    all.push(TransitionInputs {
                                        state,
                                        mode,
                                        always_hunting: false,
                                        immobile: false,
                                        aware,
                                        player_in_view: aware,
                                        feared_distance,
                                        flees_near_death,
                                        health: Health { current, max: 100 },
                                        magically_afraid,
                                        discordant,
                                        hit_steal_flee: mode == CreatureMode::PermanentlyFleeing,
                                        carries_item: false,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    all
}

/// The states from which a rule may fire.
fn admits(rule: TransitionRule, state: CreatureState) -> bool {
    use CreatureState::*;
    match rule {
        TransitionRule::AlwaysHunting | TransitionRule::Immobile => state != Ally,
        TransitionRule::Alert => state == Wandering,
        TransitionRule::WakeUp => state == Sleeping,
        TransitionRule::LoseTrack | TransitionRule::Frightened => state == TrackingScent,
        TransitionRule::NearDeath | TransitionRule::Wounded => !matches!(state, Ally | Sleeping),
        TransitionRule::RegainCourage
        | TransitionRule::ThiefReformed
        | TransitionRule::Recovered => state == Fleeing,
        TransitionRule::Unchanged => true,
    }
}

#[test]
fn every_combination_selects_a_rule_fitting_its_state() {
    let tuning = AiTuning::default();
    for inputs in every_input() {
        let rule = select_rule(&inputs, &tuning);
        assert!(
            admits(rule, inputs.effective_state()),
            "{rule} fired from {:?}: {inputs:?}",
            inputs.effective_state()
        );
        // Same inputs, same answer.
        assert_eq!(rule, select_rule(&inputs, &tuning));
    }
}

#[test]
fn discord_does_not_change_the_rule() {
    let tuning = AiTuning::default();
    for inputs in every_input().into_iter().filter(|inputs| !inputs.discordant) {
        let discordant = TransitionInputs {
            discordant: true,
            ..inputs
        };
        assert_eq!(select_rule(&inputs, &tuning), select_rule(&discordant, &tuning));
    }
}

#[test]
fn sleepers_wake_only_when_aware() {
    let tuning = AiTuning::default();
    for inputs in every_input()
        .into_iter()
        .filter(|inputs| inputs.state == CreatureState::Sleeping && inputs.mode == CreatureMode::Normal)
    {
        let expected = if inputs.aware {
            TransitionRule::WakeUp
        } else {
            TransitionRule::Unchanged
        };
        assert_eq!(select_rule(&inputs, &tuning), expected, "{inputs:?}");
    }
}

#[test]
fn hunters_that_lose_awareness_always_lose_track() {
    let tuning = AiTuning::default();
    for inputs in every_input().into_iter().filter(|inputs| {
        inputs.state == CreatureState::TrackingScent
            && inputs.mode == CreatureMode::Normal
            && !inputs.aware
    }) {
        assert_eq!(select_rule(&inputs, &tuning), TransitionRule::LoseTrack);
    }
}

#[test]
fn near_death_thresholds() {
    let tuning = AiTuning::default();
    let base = TransitionInputs {
        state: CreatureState::TrackingScent,
        mode: CreatureMode::Normal,
        always_hunting: false,
        immobile: false,
        aware: true,
        player_in_view: true,
        feared_distance: 10,
        flees_near_death: true,
        health: Health { current: 25, max: 100 },
        magically_afraid: false,
        discordant: false,
        hit_steal_flee: false,
        carries_item: false,
    };
    assert_eq!(select_rule(&base, &tuning), TransitionRule::NearDeath);

    let hurt = TransitionInputs {
        health: Health { current: 60, max: 100 },
        ..base
    };
    assert_eq!(select_rule(&hurt, &tuning), TransitionRule::Wounded);

    let still_running = TransitionInputs {
        state: CreatureState::Fleeing,
        ..hurt
    };
    assert_eq!(select_rule(&still_running, &tuning), TransitionRule::NearDeath);

    let healed = TransitionInputs {
        state: CreatureState::Fleeing,
        health: Health { current: 90, max: 100 },
        ..base
    };
    assert_eq!(select_rule(&healed, &tuning), TransitionRule::RegainCourage);
}

#[test]
fn always_hunting_and_immobile_bypass_the_table() {
    let tuning = AiTuning::default();
    for inputs in every_input().into_iter().filter(|inputs| inputs.state != CreatureState::Ally) {
        let hunter = TransitionInputs {
            always_hunting: true,
            ..inputs
        };
        assert_eq!(select_rule(&hunter, &tuning), TransitionRule::AlwaysHunting);
        let turret = TransitionInputs {
            immobile: true,
            ..inputs
        };
        assert_eq!(select_rule(&turret, &tuning), TransitionRule::Immobile);
    }
}
