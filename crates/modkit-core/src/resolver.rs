//! The resolver: manifest intake, structural validation, and dependency
//! ordering.
//!
//! [`ModResolver`] is stateless; the host owns the [`ModMetadata`] collection
//! and threads it through the three operations. None of the operations return
//! errors: every per-mod problem is recorded on the entry itself, so one
//! broken manifest never aborts the rest of the batch.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::compat::CompatSource;
use crate::decoder::ManifestDecoder;
use crate::lookup::FileLookup;
use crate::metadata::{id_key, ModFailReason, ModMetadata};
use crate::version::SemanticVersion;

/// The manifest file name expected in each mod folder.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Decides which candidate folders are ignored entirely during intake.
///
/// Ignored folders are invisible to every later stage; they are not marked
/// failed. The default ignores dot-prefixed folders.
#[derive(Debug, Clone)]
pub struct FolderFilter {
    ignore_prefixes: Vec<String>,
}

impl FolderFilter {
    pub fn new(ignore_prefixes: Vec<String>) -> Self {
        Self { ignore_prefixes }
    }

    pub fn is_ignored(&self, folder_name: &str) -> bool {
        self.ignore_prefixes.iter().any(|prefix| folder_name.starts_with(prefix.as_str()))
    }
}

impl Default for FolderFilter {
    fn default() -> Self {
        Self { ignore_prefixes: vec![".".to_string()] }
    }
}

/// Visit state for the dependency walk. Membership checks are O(1) against
/// this arena instead of chasing object references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// A frame on the explicit DFS stack: a pending mod plus the index of the
/// next declared dependency to examine.
#[derive(Debug, Clone, Copy)]
struct Frame {
    index: usize,
    cursor: usize,
}

/// Validates mod manifests and computes a deterministic load order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModResolver;

impl ModResolver {
    pub fn new() -> Self {
        Self
    }

    /// Read the manifest for every non-ignored subfolder of `root`.
    ///
    /// Each subfolder yields exactly one entry: `Found` wrapping the parsed
    /// manifest, or `Failed` when the manifest is missing or unreadable. The
    /// output is sorted by folder name so later stages are deterministic
    /// regardless of platform enumeration order.
    pub fn read_manifests(
        &self,
        root: &Path,
        decoder: &dyn ManifestDecoder,
        filter: &FolderFilter,
    ) -> Vec<ModMetadata> {
        let mut mods = Vec::new();

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Couldn't read mod root folder {}: {e}", root.display());
                return mods;
            }
        };

        let mut folders: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        folders.sort();

        for folder in folders {
            let folder_name = folder
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            if filter.is_ignored(&folder_name) {
                log::debug!("Ignoring mod folder '{folder_name}'");
                continue;
            }

            let manifest_path = folder.join(MANIFEST_FILE);
            let entry = match fs::read_to_string(&manifest_path) {
                Ok(raw) => match decoder.decode(&raw) {
                    Ok(manifest) => ModMetadata::found(manifest, folder),
                    Err(e) => ModMetadata::failed(
                        folder,
                        ModFailReason::ParseError,
                        format!("its manifest couldn't be parsed: {e}"),
                    ),
                },
                Err(e) if e.kind() == io::ErrorKind::NotFound => ModMetadata::failed(
                    folder,
                    ModFailReason::ParseError,
                    format!("it has no {MANIFEST_FILE} file"),
                ),
                // Unexpected I/O problems (e.g. permissions) fail the entry
                // but keep the batch going.
                Err(e) => ModMetadata::failed(
                    folder,
                    ModFailReason::LoadFailed,
                    format!("its manifest couldn't be read: {e}"),
                ),
            };
            mods.push(entry);
        }

        log::debug!("Read {} mod folder(s) under {}", mods.len(), root.display());
        mods
    }

    /// Validate each `Found` entry independently, then fail duplicate IDs.
    ///
    /// Per-entry checks run in a fixed order and the first failing condition
    /// wins: assume-broken override, minimum host API version, minimum
    /// platform version, then entry-file existence (skippable via
    /// `validate_files_exist`). A cross-entry pass then fails *every* member
    /// of a case-insensitive duplicate-ID group. Already-failed entries are
    /// left untouched.
    pub fn validate_manifests(
        &self,
        mods: &mut [ModMetadata],
        host_api_version: &SemanticVersion,
        platform_version: &SemanticVersion,
        compat: &dyn CompatSource,
        file_lookup: &dyn FileLookup,
        validate_files_exist: bool,
    ) {
        for entry in mods.iter_mut() {
            if !entry.is_found() {
                continue;
            }
            let failure = Self::validate_entry(
                entry,
                host_api_version,
                platform_version,
                compat,
                file_lookup,
                validate_files_exist,
            );
            if let Some((reason, message)) = failure {
                entry.set_failed(reason, message);
            }
        }

        // Group the still-valid entries by unique ID; a shared ID fails every
        // member of the group, not just the later ones.
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, entry) in mods.iter().enumerate() {
            if !entry.is_found() {
                continue;
            }
            if let Some(id) = entry.unique_id() {
                groups.entry(id_key(id)).or_default().push(index);
            }
        }
        for indexes in groups.into_values() {
            if indexes.len() < 2 {
                continue;
            }
            for &index in &indexes {
                let id = mods[index].unique_id().unwrap_or_default().to_string();
                mods[index].set_failed(
                    ModFailReason::DuplicateId,
                    format!("its unique ID '{id}' is used by {} installed mods", indexes.len()),
                );
            }
        }
    }

    fn validate_entry(
        entry: &ModMetadata,
        host_api_version: &SemanticVersion,
        platform_version: &SemanticVersion,
        compat: &dyn CompatSource,
        file_lookup: &dyn FileLookup,
        validate_files_exist: bool,
    ) -> Option<(ModFailReason, String)> {
        let manifest = entry.manifest()?;

        if let Some(entry_override) = compat.lookup(&manifest.unique_id) {
            if entry_override.assume_broken {
                return Some((
                    ModFailReason::AssumedBroken,
                    "it's known to be broken with the current host version".to_string(),
                ));
            }
        }

        if let Some(minimum) = &manifest.minimum_host_api_version {
            if minimum > host_api_version {
                return Some((
                    ModFailReason::HostVersionTooOld,
                    format!(
                        "it needs host API version {minimum} or newer (you have {host_api_version})"
                    ),
                ));
            }
        }

        if let Some(minimum) = &manifest.minimum_platform_version {
            if minimum > platform_version {
                return Some((
                    ModFailReason::PlatformVersionTooOld,
                    format!(
                        "it needs platform version {minimum} or newer (you have {platform_version})"
                    ),
                ));
            }
        }

        if validate_files_exist && !manifest.is_content_pack() {
            if let Some(assembly) = &manifest.entry_assembly {
                if !file_lookup.file_exists(entry.directory_path(), assembly) {
                    return Some((
                        ModFailReason::MissingEntryFile,
                        format!("its entry file '{assembly}' doesn't exist in the mod folder"),
                    ));
                }
            }
        }

        None
    }

    /// Reorder mods so every entry follows its resolved required
    /// dependencies, marking newly discovered dependency failures in place.
    ///
    /// The output is a permutation of the input: same entries, none dropped
    /// or duplicated. Already-failed entries are emitted first in their
    /// original order without touching anything but their status. Remaining
    /// entries are visited depth-first in input order, so a fixed input order
    /// always produces the same output order.
    pub fn process_dependencies(
        &self,
        mods: Vec<ModMetadata>,
        compat: &dyn CompatSource,
    ) -> Vec<ModMetadata> {
        let mut mods = mods;

        // Partition into already-failed (emitted up front, cheap to
        // short-circuit) and pending, both preserving input order.
        let mut order: Vec<usize> = Vec::with_capacity(mods.len());
        let mut pending: Vec<usize> = Vec::new();
        for (index, entry) in mods.iter().enumerate() {
            if entry.is_found() {
                pending.push(index);
            } else {
                order.push(index);
            }
        }

        // Dependency targets resolve against the pending entries only; a
        // dependency on an already-failed ID is equivalent to a missing one.
        let mut found_by_id: HashMap<String, usize> = HashMap::new();
        for &index in &pending {
            if let Some(id) = mods[index].unique_id() {
                found_by_id.entry(id_key(id)).or_insert(index);
            }
        }
        let failed_ids: HashSet<String> = order
            .iter()
            .filter_map(|&index| mods[index].unique_id().map(id_key))
            .collect();

        let mut state = vec![Visit::Unvisited; mods.len()];

        for &start in &pending {
            if state[start] != Visit::Unvisited {
                continue;
            }
            state[start] = Visit::InProgress;
            let mut stack: Vec<Frame> = vec![Frame { index: start, cursor: 0 }];

            while let Some(&Frame { index, cursor }) = stack.last() {
                let dependency_count =
                    mods[index].manifest().map_or(0, |m| m.dependencies.len());

                // Once an entry fails mid-visit its remaining dependencies
                // aren't walked; it's still emitted exactly once.
                if cursor >= dependency_count || mods[index].is_failed() {
                    state[index] = Visit::Done;
                    order.push(index);
                    stack.pop();
                    continue;
                }

                let (dep_id, dep_minimum, dep_required) = {
                    let dependency = &mods[index]
                        .manifest()
                        .expect("pending mods always carry a manifest")
                        .dependencies[cursor];
                    (
                        dependency.unique_id.clone(),
                        dependency.minimum_version.clone(),
                        dependency.required,
                    )
                };

                match found_by_id.get(&id_key(&dep_id)).copied() {
                    // Not resolvable: fail if required, ignore if optional.
                    None => {
                        if dep_required {
                            let message = if failed_ids.contains(&id_key(&dep_id)) {
                                format!("it requires the '{dep_id}' mod, which couldn't be loaded")
                            } else {
                                format!("it requires the '{dep_id}' mod, which isn't installed")
                            };
                            mods[index]
                                .set_failed(ModFailReason::MissingRequiredDependency, message);
                        }
                        Self::advance(&mut stack);
                    }

                    Some(dep_index) => match state[dep_index] {
                        // Dependencies resolve before their dependents:
                        // recurse, re-examining this edge once the child is
                        // done.
                        Visit::Unvisited => {
                            state[dep_index] = Visit::InProgress;
                            stack.push(Frame { index: dep_index, cursor: 0 });
                        }

                        // A back edge onto the active chain: the whole loop
                        // can never order correctly, so fail every member.
                        Visit::InProgress => {
                            let chain_start = stack
                                .iter()
                                .position(|frame| frame.index == dep_index)
                                .expect("in-progress mods are on the active stack");
                            let mut chain: Vec<String> = stack[chain_start..]
                                .iter()
                                .map(|frame| {
                                    mods[frame.index].unique_id().unwrap_or_default().to_string()
                                })
                                .collect();
                            chain.push(dep_id.clone());
                            let message =
                                format!("its dependencies form a cycle: {}", chain.join(" -> "));
                            for frame_index in chain_start..stack.len() {
                                let member = stack[frame_index].index;
                                mods[member].set_failed(
                                    ModFailReason::CircularDependency,
                                    message.clone(),
                                );
                            }
                            Self::advance(&mut stack);
                        }

                        // The dependency is fully resolved; apply the failed
                        // prerequisite and minimum-version rules.
                        Visit::Done => {
                            if mods[dep_index].is_failed() {
                                if dep_required {
                                    mods[index].set_failed(
                                        ModFailReason::MissingRequiredDependency,
                                        format!(
                                            "it requires the '{dep_id}' mod, which couldn't be loaded"
                                        ),
                                    );
                                }
                            } else if let Some(minimum) = &dep_minimum {
                                let installed = Self::installed_version(&mods, dep_index, compat);
                                if !installed.is_at_least(minimum) {
                                    mods[index].set_failed(
                                        ModFailReason::DependencyVersionTooLow,
                                        format!(
                                            "it needs the '{dep_id}' mod version {minimum} or newer, but version {installed} is installed"
                                        ),
                                    );
                                }
                            }
                            Self::advance(&mut stack);
                        }
                    },
                }
            }
        }

        debug_assert_eq!(order.len(), mods.len());

        let mut slots: Vec<Option<ModMetadata>> = mods.into_iter().map(Some).collect();
        order
            .into_iter()
            .map(|index| slots[index].take().expect("each mod is emitted exactly once"))
            .collect()
    }

    /// The version a dependency resolves at: the compat source's override
    /// when present, else the manifest version.
    fn installed_version(
        mods: &[ModMetadata],
        index: usize,
        compat: &dyn CompatSource,
    ) -> SemanticVersion {
        let manifest = mods[index]
            .manifest()
            .expect("resolved dependencies always carry a manifest");
        compat
            .lookup(&manifest.unique_id)
            .and_then(|entry| entry.version_override.clone())
            .unwrap_or_else(|| manifest.version.clone())
    }

    /// Move the top frame past its current dependency edge.
    fn advance(stack: &mut [Frame]) {
        if let Some(top) = stack.last_mut() {
            top.cursor += 1;
        }
    }
}
