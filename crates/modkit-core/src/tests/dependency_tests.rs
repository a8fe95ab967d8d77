#![cfg(test)]

use std::path::PathBuf;

use crate::compat::{CompatDatabase, CompatOverride};
use crate::manifest::{Manifest, ManifestDependency};
use crate::metadata::{ModFailReason, ModMetadata};
use crate::resolver::ModResolver;
use crate::version::SemanticVersion;

fn mk_mod(unique_id: &str, dependencies: &[ManifestDependency]) -> ModMetadata {
    mk_mod_versioned(unique_id, "1.0", dependencies)
}

fn mk_mod_versioned(unique_id: &str, version: &str, dependencies: &[ManifestDependency]) -> ModMetadata {
    let mut manifest = Manifest::new(
        unique_id,
        unique_id,
        "author",
        SemanticVersion::parse(version).unwrap(),
    );
    for dependency in dependencies {
        manifest.add_dependency(dependency.clone());
    }
    ModMetadata::found(manifest, PathBuf::from(format!("/mods/{unique_id}")))
}

fn process(mods: Vec<ModMetadata>) -> Vec<ModMetadata> {
    ModResolver::new().process_dependencies(mods, &CompatDatabase::new())
}

fn ids(mods: &[ModMetadata]) -> Vec<&str> {
    mods.iter().map(|m| m.unique_id().unwrap_or("<no manifest>")).collect()
}

#[test]
fn test_no_mods_does_nothing() {
    assert!(process(Vec::new()).is_empty());
}

#[test]
fn test_no_dependencies_preserves_input_order() {
    let mods = process(vec![mk_mod("Mod A", &[]), mk_mod("Mod B", &[]), mk_mod("Mod C", &[])]);

    assert_eq!(ids(&mods), vec!["Mod A", "Mod B", "Mod C"]);
    assert!(mods.iter().all(|m| m.is_found()));
}

#[test]
fn test_simple_dependencies_are_reordered() {
    // A ◀── B
    // ▲     ▲
    // │     │
    // └─ C ─┘
    let mods = process(vec![
        mk_mod("Mod C", &[ManifestDependency::required_any("Mod A"), ManifestDependency::required_any("Mod B")]),
        mk_mod("Mod A", &[]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
    ]);

    assert_eq!(ids(&mods), vec!["Mod A", "Mod B", "Mod C"]);
    assert!(mods.iter().all(|m| m.is_found()));
}

#[test]
fn test_dependency_chain_is_reordered() {
    // A ◀── B ◀── C ◀── D
    let mods = process(vec![
        mk_mod("Mod C", &[ManifestDependency::required_any("Mod B")]),
        mk_mod("Mod A", &[]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
        mk_mod("Mod D", &[ManifestDependency::required_any("Mod C")]),
    ]);

    assert_eq!(ids(&mods), vec!["Mod A", "Mod B", "Mod C", "Mod D"]);
}

#[test]
fn test_overlapping_dependency_chains_are_reordered() {
    // A ◀── B ◀── C ◀── D
    //       ▲     ▲
    //       │     │
    //       E ◀── F
    let mods = process(vec![
        mk_mod("Mod C", &[ManifestDependency::required_any("Mod B")]),
        mk_mod("Mod A", &[]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
        mk_mod("Mod D", &[ManifestDependency::required_any("Mod C")]),
        mk_mod("Mod F", &[ManifestDependency::required_any("Mod C"), ManifestDependency::required_any("Mod E")]),
        mk_mod("Mod E", &[ManifestDependency::required_any("Mod B")]),
    ]);

    assert_eq!(ids(&mods), vec!["Mod A", "Mod B", "Mod C", "Mod D", "Mod E", "Mod F"]);
}

#[test]
fn test_cycle_members_all_fail_and_acyclic_portion_orders() {
    // A ◀── B ◀── C ──▶ D
    //             ▲     │
    //             │     ▼
    //             └──── E
    let mods = process(vec![
        mk_mod("Mod C", &[ManifestDependency::required_any("Mod B"), ManifestDependency::required_any("Mod D")]),
        mk_mod("Mod A", &[]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
        mk_mod("Mod D", &[ManifestDependency::required_any("Mod E")]),
        mk_mod("Mod E", &[ManifestDependency::required_any("Mod C")]),
    ]);

    assert_eq!(mods.len(), 5, "cycle members are still emitted");
    assert_eq!(ids(&mods)[..2], ["Mod A", "Mod B"]);
    for id in ["Mod C", "Mod D", "Mod E"] {
        let entry = mods.iter().find(|m| m.has_id(id)).unwrap();
        assert_eq!(
            entry.fail_reason(),
            Some(ModFailReason::CircularDependency),
            "{id} is part of the dependency loop"
        );
    }
}

#[test]
fn test_two_mod_cycle_fails_both() {
    let mods = process(vec![
        mk_mod("Mod A", &[ManifestDependency::required_any("Mod B")]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
    ]);

    assert_eq!(mods.len(), 2);
    for entry in &mods {
        assert_eq!(entry.fail_reason(), Some(ModFailReason::CircularDependency));
        assert!(entry.error_message().unwrap().contains("cycle"));
    }
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let mods = process(vec![mk_mod("Mod A", &[ManifestDependency::required_any("Mod A")])]);

    assert_eq!(mods.len(), 1);
    assert_eq!(mods[0].fail_reason(), Some(ModFailReason::CircularDependency));
}

#[test]
fn test_already_failed_mods_are_emitted_first() {
    // A ◀── B ◀── C   D (failed)
    let failed = ModMetadata::failed(
        PathBuf::from("/mods/Mod D"),
        ModFailReason::ParseError,
        "its manifest couldn't be parsed",
    );
    let mods = process(vec![
        mk_mod("Mod C", &[ManifestDependency::required_any("Mod B")]),
        mk_mod("Mod A", &[]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
        failed,
    ]);

    assert_eq!(mods.len(), 4);
    assert_eq!(mods[0].display_name(), "Mod D", "already-failed entries come first");
    assert_eq!(ids(&mods)[1..], ["Mod A", "Mod B", "Mod C"]);
}

#[test]
fn test_missing_required_dependency_fails_dependent() {
    let mods = process(vec![mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")])]);

    assert_eq!(mods.len(), 1);
    assert_eq!(mods[0].fail_reason(), Some(ModFailReason::MissingRequiredDependency));
    assert!(mods[0].error_message().unwrap().contains("isn't installed"));
}

#[test]
fn test_failed_required_dependency_fails_dependent() {
    // a failed prerequisite is equivalent to a missing one
    let mut broken = mk_mod("Mod A", &[]);
    broken.set_failed(ModFailReason::AssumedBroken, "it's known to be broken");

    let mods = process(vec![
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
        broken,
    ]);

    assert_eq!(mods.len(), 2);
    let dependent = mods.iter().find(|m| m.has_id("Mod B")).unwrap();
    assert_eq!(dependent.fail_reason(), Some(ModFailReason::MissingRequiredDependency));
    assert!(dependent.error_message().unwrap().contains("couldn't be loaded"));
}

#[test]
fn test_failure_propagates_transitively_in_one_pass() {
    // C ──▶ B ──▶ A where A isn't installed
    let mods = process(vec![
        mk_mod("Mod C", &[ManifestDependency::required_any("Mod B")]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
    ]);

    assert_eq!(mods.len(), 2);
    for entry in &mods {
        assert_eq!(entry.fail_reason(), Some(ModFailReason::MissingRequiredDependency));
    }
}

#[test]
fn test_unmet_minimum_version_fails_dependent() {
    // A 1.0 ◀── B (needs A 1.1)
    let mods = process(vec![
        mk_mod_versioned("Mod A", "1.0", &[]),
        mk_mod(
            "Mod B",
            &[ManifestDependency::required("Mod A", SemanticVersion::parse("1.1").unwrap())],
        ),
    ]);

    assert_eq!(mods.len(), 2);
    let provider = mods.iter().find(|m| m.has_id("Mod A")).unwrap();
    assert!(provider.is_found(), "the too-old dependency itself stays valid");
    let dependent = mods.iter().find(|m| m.has_id("Mod B")).unwrap();
    assert_eq!(dependent.fail_reason(), Some(ModFailReason::DependencyVersionTooLow));
}

#[test]
fn test_met_minimum_version_passes() {
    // A 1.0 ◀── B (needs A 1.0-beta)
    let mods = process(vec![
        mk_mod_versioned("Mod A", "1.0", &[]),
        mk_mod(
            "Mod B",
            &[ManifestDependency::required("Mod A", SemanticVersion::parse("1.0-beta").unwrap())],
        ),
    ]);

    assert_eq!(ids(&mods), vec!["Mod A", "Mod B"]);
    assert!(mods.iter().all(|m| m.is_found()));
}

#[test]
fn test_version_override_satisfies_minimum() {
    // the compat source corrects A's version to 1.1, so B's constraint is met
    let mut compat = CompatDatabase::new();
    compat.insert("Mod A", CompatOverride::version(SemanticVersion::new(1, 1, 0)));

    let mods = ModResolver::new().process_dependencies(
        vec![
            mk_mod_versioned("Mod A", "1.0", &[]),
            mk_mod(
                "Mod B",
                &[ManifestDependency::required("Mod A", SemanticVersion::parse("1.1").unwrap())],
            ),
        ],
        &compat,
    );

    assert_eq!(ids(&mods), vec!["Mod A", "Mod B"]);
    assert!(mods.iter().all(|m| m.is_found()));
}

#[test]
fn test_optional_dependency_is_ordered_when_present() {
    // A ◀┄┄ B (optional)
    let mods = process(vec![
        mk_mod(
            "Mod B",
            &[ManifestDependency::optional("Mod A", SemanticVersion::parse("1.0").unwrap())],
        ),
        mk_mod_versioned("Mod A", "1.0", &[]),
    ]);

    assert_eq!(ids(&mods), vec!["Mod A", "Mod B"]);
    assert!(mods.iter().all(|m| m.is_found()));
}

#[test]
fn test_missing_optional_dependency_is_ignored() {
    let mods = process(vec![mk_mod("Mod B", &[ManifestDependency::optional_any("Not.Installed")])]);

    assert_eq!(mods.len(), 1);
    assert!(mods[0].is_found(), "an absent optional dependency never fails the dependent");
}

#[test]
fn test_failed_optional_dependency_is_ignored() {
    let mut broken = mk_mod("Mod A", &[]);
    broken.set_failed(ModFailReason::AssumedBroken, "it's known to be broken");

    let mods = process(vec![
        mk_mod("Mod B", &[ManifestDependency::optional_any("Mod A")]),
        broken,
    ]);

    let dependent = mods.iter().find(|m| m.has_id("Mod B")).unwrap();
    assert!(dependent.is_found());
}

#[test]
fn test_present_optional_dependency_below_minimum_fails_dependent() {
    // an installed-but-outdated optional dependency is a real error
    let mods = process(vec![
        mk_mod_versioned("Mod A", "1.0", &[]),
        mk_mod(
            "Mod B",
            &[ManifestDependency::optional("Mod A", SemanticVersion::parse("2.0").unwrap())],
        ),
    ]);

    let dependent = mods.iter().find(|m| m.has_id("Mod B")).unwrap();
    assert_eq!(dependent.fail_reason(), Some(ModFailReason::DependencyVersionTooLow));
}

#[test]
fn test_dependency_ids_match_case_insensitively() {
    let mods = process(vec![
        mk_mod("Mod B", &[ManifestDependency::required_any("MOD a")]),
        mk_mod("Mod A", &[]),
    ]);

    assert_eq!(ids(&mods), vec!["Mod A", "Mod B"]);
    assert!(mods.iter().all(|m| m.is_found()));
}

#[test]
fn test_output_is_a_permutation_of_input() {
    let input = vec![
        mk_mod("Mod C", &[ManifestDependency::required_any("Mod B"), ManifestDependency::required_any("Mod D")]),
        mk_mod("Mod A", &[]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
        mk_mod("Mod D", &[ManifestDependency::required_any("Mod E")]),
        mk_mod("Mod E", &[ManifestDependency::required_any("Mod C")]),
        mk_mod("Mod F", &[ManifestDependency::required_any("Not.Installed")]),
    ];
    let mut expected: Vec<String> =
        input.iter().map(|m| m.unique_id().unwrap().to_string()).collect();

    let mods = process(input);
    let mut actual: Vec<String> = ids(&mods).iter().map(|s| s.to_string()).collect();

    expected.sort();
    actual.sort();
    assert_eq!(actual, expected, "no entry is dropped or duplicated");
}

#[test]
fn test_reprocessing_sorted_output_preserves_order() {
    let first = process(vec![
        mk_mod("Mod C", &[ManifestDependency::required_any("Mod A"), ManifestDependency::required_any("Mod B")]),
        mk_mod("Mod A", &[]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
    ]);
    let first_order: Vec<String> = ids(&first).iter().map(|s| s.to_string()).collect();

    let second = process(first);

    assert_eq!(ids(&second), first_order.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn test_ordering_invariant_holds_for_resolved_dependencies() {
    let mods = process(vec![
        mk_mod("Mod D", &[ManifestDependency::required_any("Mod C")]),
        mk_mod("Mod C", &[ManifestDependency::required_any("Mod B")]),
        mk_mod("Mod B", &[ManifestDependency::required_any("Mod A")]),
        mk_mod("Mod A", &[]),
    ]);

    let position = |id: &str| mods.iter().position(|m| m.has_id(id)).unwrap();
    assert!(position("Mod A") < position("Mod B"));
    assert!(position("Mod B") < position("Mod C"));
    assert!(position("Mod C") < position("Mod D"));
}
