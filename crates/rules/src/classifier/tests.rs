//! Tests for the classifier.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use metagame_core::{CardName, Deck, Zone};

use super::*;
use crate::model::{Condition, RuleSet, Variant};

fn cards(names: &[&str]) -> Vec<CardName> {
    names.iter().map(|n| CardName::from(*n)).collect()
}

fn main_has(names: &[&str]) -> Condition {
    Condition::All {
        zone: Zone::Mainboard,
        cards: cards(names),
    }
}

fn archetype(name: &str, conditions: Vec<Condition>, variants: Vec<Variant>) -> ArchetypeDefinition {
    ArchetypeDefinition {
        name: name.to_string(),
        include_color_in_name: false,
        conditions,
        variants,
    }
}

fn variant(name: &str, conditions: Vec<Condition>) -> Variant {
    Variant {
        name: name.to_string(),
        conditions,
    }
}

fn fallback(name: &str, common: &[&str]) -> FallbackDefinition {
    FallbackDefinition {
        name: name.to_string(),
        include_color_in_name: false,
        common_cards: cards(common),
    }
}

fn classifier_with(format: &str, rules: RuleSet) -> (Classifier, Format) {
    let store = Arc::new(RuleStore::new());
    let format = Format::from(format);
    store.publish(format.clone(), rules);
    (Classifier::new(store), format)
}

fn burn_deck() -> Deck {
    Deck::from_lists(
        [("Lightning Bolt", 4), ("Goblin Guide", 4), ("Mountain", 20)],
        [("Smash to Smithereens", 2)],
    )
}

const TEN_CONTROL_CARDS: [&str; 10] = [
    "Counterspell",
    "Opt",
    "Memory Lapse",
    "Brainstorm",
    "Force of Will",
    "Jace, the Mind Sculptor",
    "Snapcaster Mage",
    "Cryptic Command",
    "Mana Leak",
    "Remand",
];

#[test]
fn archetype_match_has_full_confidence() {
    let (classifier, format) = classifier_with(
        "modern",
        RuleSet {
            archetypes: vec![archetype("Burn", vec![main_has(&["Lightning Bolt"])], vec![])],
            fallbacks: vec![],
        },
    );
    let result = classifier.classify(&format, &burn_deck());
    assert_eq!(result.archetype, "Burn");
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.method, ClassificationMethod::ArchetypeRules);
    assert_eq!(result.rule_name.as_deref(), Some("Burn"));
}

#[test]
fn classification_is_idempotent() {
    let (classifier, format) = classifier_with(
        "modern",
        RuleSet {
            archetypes: vec![archetype("Burn", vec![main_has(&["Goblin Guide"])], vec![])],
            fallbacks: vec![fallback("Red Aggro", &["Lightning Bolt"])],
        },
    );
    let deck = burn_deck();
    assert_eq!(classifier.classify(&format, &deck), classifier.classify(&format, &deck));
}

#[test]
fn first_match_wins_over_better_match() {
    // Both archetypes hold; the second is "more specific" but loads later.
    let (classifier, format) = classifier_with(
        "modern",
        RuleSet {
            archetypes: vec![
                archetype("Red Deck", vec![main_has(&["Mountain"])], vec![]),
                archetype(
                    "Burn",
                    vec![main_has(&["Lightning Bolt", "Goblin Guide", "Mountain"])],
                    vec![],
                ),
            ],
            fallbacks: vec![],
        },
    );
    assert_eq!(classifier.classify(&format, &burn_deck()).archetype, "Red Deck");
}

#[test]
fn variant_resolution() {
    let rules = RuleSet {
        archetypes: vec![archetype(
            "Burn",
            vec![main_has(&["Lightning Bolt"])],
            vec![
                variant("Boros", vec![main_has(&["Lightning Helix"])]),
                variant("Sligh", vec![main_has(&["Goblin Guide"])]),
                variant("Guide", vec![main_has(&["Goblin Guide"])]),
            ],
        )],
        fallbacks: vec![],
    };
    let (classifier, format) = classifier_with("modern", rules);

    let result = classifier.classify(&format, &burn_deck());
    assert_eq!(result.archetype, "Burn Sligh");
    assert_eq!(result.rule_name.as_deref(), Some("Burn Sligh"));

    let plain = Deck::from_lists([("Lightning Bolt", 4)], []);
    assert_eq!(classifier.classify(&format, &plain).archetype, "Burn");
}

#[test]
fn variant_not_checked_when_archetype_fails() {
    let rules = RuleSet {
        archetypes: vec![archetype(
            "Burn",
            vec![main_has(&["Lava Spike"])],
            vec![variant("Guide", vec![main_has(&["Goblin Guide"])])],
        )],
        fallbacks: vec![],
    };
    let (classifier, format) = classifier_with("modern", rules);
    assert!(classifier.classify(&format, &burn_deck()).is_unknown());
}

#[test]
fn fallback_threshold_is_inclusive_at_ten_percent() {
    let (classifier, format) = classifier_with(
        "legacy",
        RuleSet {
            archetypes: vec![],
            fallbacks: vec![fallback("Blue Control", &TEN_CONTROL_CARDS)],
        },
    );

    let one_of_ten = Deck::from_lists([("Counterspell", 4), ("Island", 20)], []);
    let result = classifier.classify(&format, &one_of_ten);
    assert_eq!(result.method, ClassificationMethod::FallbackRules);
    assert_eq!(result.archetype, "Blue Control");
    assert!((result.confidence - 0.1).abs() < 1e-9);

    let none_of_ten = Deck::from_lists([("Island", 20)], []);
    let result = classifier.classify(&format, &none_of_ten);
    assert_eq!(result, ClassificationResult::unknown(result.snapshot_version));
}

#[test]
fn fallback_counts_sideboard_cards() {
    let (classifier, format) = classifier_with(
        "legacy",
        RuleSet {
            archetypes: vec![],
            fallbacks: vec![fallback("Blue Control", &["Counterspell", "Opt"])],
        },
    );
    let deck = Deck::from_lists([("Opt", 4)], [("Counterspell", 2)]);
    let result = classifier.classify(&format, &deck);
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn best_fallback_wins_and_ties_keep_load_order() {
    let (classifier, format) = classifier_with(
        "legacy",
        RuleSet {
            archetypes: vec![],
            fallbacks: vec![
                fallback("Red Aggro", &["Lightning Bolt", "Chain Lightning", "Fireblast", "Price of Progress"]),
                fallback("Goblins", &["Goblin Guide", "Goblin Lackey"]),
                fallback("Mono Red", &["Mountain", "Eidolon of the Great Revel"]),
            ],
        },
    );
    // Red Aggro 25%, Goblins 50%, Mono Red 50%.
    let result = classifier.classify(&format, &burn_deck());
    assert_eq!(result.archetype, "Goblins");
    assert_eq!(result.confidence, 0.5);
}

#[test]
fn threshold_can_be_raised() {
    let store = Arc::new(RuleStore::new());
    let format = Format::from("legacy");
    store.publish(
        format.clone(),
        RuleSet {
            archetypes: vec![],
            fallbacks: vec![fallback("Blue Control", &TEN_CONTROL_CARDS)],
        },
    );
    let classifier = Classifier::new(store).with_min_fallback_score(25.0);
    let deck = Deck::from_lists([("Counterspell", 4), ("Opt", 4)], []);
    assert!(classifier.classify(&format, &deck).is_unknown());
}

#[test]
fn archetypes_take_priority_over_fallbacks() {
    let (classifier, format) = classifier_with(
        "modern",
        RuleSet {
            archetypes: vec![archetype("Burn", vec![main_has(&["Goblin Guide"])], vec![])],
            fallbacks: vec![fallback("Mono Red", &["Lightning Bolt", "Mountain"])],
        },
    );
    let result = classifier.classify(&format, &burn_deck());
    assert_eq!(result.method, ClassificationMethod::ArchetypeRules);
}

#[test]
fn unknown_format_degrades_to_none() {
    let classifier = Classifier::new(Arc::new(RuleStore::new()));
    let result = classifier.classify(&Format::from("vintage"), &burn_deck());
    assert_eq!(result.archetype, UNKNOWN_ARCHETYPE);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.method, ClassificationMethod::None);
    assert!(result.snapshot_version.is_none());
}

#[test]
fn format_lookup_is_case_insensitive() {
    let (classifier, _) = classifier_with(
        "Modern",
        RuleSet {
            archetypes: vec![archetype("Burn", vec![main_has(&["Lightning Bolt"])], vec![])],
            fallbacks: vec![],
        },
    );
    let result = classifier.classify(&Format::from("MODERN"), &burn_deck());
    assert_eq!(result.archetype, "Burn");
}

#[test]
fn color_naming_prefixes_only_flagged_rules() {
    let colors = StaticCardColors::new()
        .with("Monastery Swiftspear", "R")
        .with("Lightning Bolt", "R")
        .with("Expressive Iteration", "UR")
        .with("Island", "C");
    let store = Arc::new(RuleStore::new());
    let format = Format::from("modern");
    let mut prowess = archetype(
        "Prowess",
        vec![main_has(&["Monastery Swiftspear"])],
        vec![variant("Delver", vec![main_has(&["Delver of Secrets"])])],
    );
    prowess.include_color_in_name = true;
    store.publish(
        format.clone(),
        RuleSet {
            archetypes: vec![prowess, archetype("Burn", vec![main_has(&["Goblin Guide"])], vec![])],
            fallbacks: vec![],
        },
    );
    let classifier = Classifier::new(store).with_card_colors(Arc::new(colors));

    let izzet = Deck::from_lists(
        [
            ("Monastery Swiftspear", 4),
            ("Expressive Iteration", 4),
            ("Delver of Secrets", 4),
            ("Island", 4),
        ],
        [],
    );
    let result = classifier.classify(&format, &izzet);
    assert_eq!(result.archetype, "Izzet Prowess Delver");
    assert_eq!(result.rule_name.as_deref(), Some("Prowess Delver"));

    // Burn is not flagged: name unchanged even though a resolver is set.
    assert_eq!(classifier.classify(&format, &burn_deck()).archetype, "Burn");
}

#[test]
fn color_naming_without_resolver_is_noop() {
    let mut prowess = archetype("Prowess", vec![main_has(&["Lightning Bolt"])], vec![]);
    prowess.include_color_in_name = true;
    let (classifier, format) = classifier_with(
        "modern",
        RuleSet {
            archetypes: vec![prowess],
            fallbacks: vec![],
        },
    );
    assert_eq!(classifier.classify(&format, &burn_deck()).archetype, "Prowess");
}

#[test]
fn fallback_score_is_percentage() {
    let fb = fallback("Control", &["Counterspell", "Opt", "Brainstorm", "Ponder"]);
    let deck = Deck::from_lists([("Opt", 1)], [("Ponder", 1)]);
    assert_eq!(fallback_score(&fb, &deck), 50.0);
}

#[test]
fn concurrent_reads_never_see_a_hybrid_snapshot() {
    fn rules(tag: &str) -> RuleSet {
        RuleSet {
            archetypes: vec![archetype(
                "Burn",
                vec![main_has(&["Lightning Bolt"])],
                vec![variant(tag, vec![main_has(&["Goblin Guide"])])],
            )],
            fallbacks: vec![fallback(&format!("Fallback {}", tag), &["Opt"])],
        }
    }

    let store = Arc::new(RuleStore::new());
    let format = Format::from("modern");
    let expected: Arc<Mutex<HashMap<u64, String>>> = Arc::default();

    let first = store.publish(format.clone(), rules("V0"));
    expected.lock().unwrap().insert(first.version, "Burn V0".to_string());

    let classifier = Classifier::new(Arc::clone(&store));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let classifier = classifier.clone();
            let format = format.clone();
            thread::spawn(move || {
                let deck = burn_deck();
                (0..500)
                    .map(|_| classifier.classify(&format, &deck))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for i in 1..50 {
        let tag = format!("V{}", i);
        let snapshot = store.publish(format.clone(), rules(&tag));
        expected
            .lock()
            .unwrap()
            .insert(snapshot.version, format!("Burn {}", tag));
    }

    let expected = expected.lock().unwrap();
    for reader in readers {
        for result in reader.join().unwrap() {
            let version = result.snapshot_version.unwrap();
            assert_eq!(&result.archetype, expected.get(&version).unwrap());
        }
    }
}
