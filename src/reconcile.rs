// file: src/reconcile.rs
// description: Destination naming and create-vs-reuse resolution for restore
// reference: pure reconciliation logic, no I/O

use std::collections::HashMap;

/// Outcome of looking a restored repository up against the destination
/// account. `existing_address` is `None` when the repository must be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResolution {
    pub target_name: String,
    pub existing_address: Option<String>,
}

/// Decides what a backed-up repository should be called on the destination
/// account.
///
/// Repositories the source user owned directly keep their bare name; anything
/// that lived under a group is flattened into a single qualified name, since
/// the destination account may have no equivalent group structure. Nested
/// subgroup paths flatten their separators too, so `group/sub` + `proj`
/// becomes `group-sub-proj`.
pub fn resolve_target_name(
    owning_group: &str,
    source_username: &str,
    repository_name: &str,
) -> String {
    if owning_group == source_username {
        repository_name.to_string()
    } else {
        format!("{}-{}", owning_group.replace('/', "-"), repository_name)
    }
}

/// Resolves a mirror entry against the destination's existing repositories,
/// keyed by bare name. The decision is made exactly once per entry; callers
/// must not re-resolve after a transfer has started.
pub fn resolve_destination(
    owning_group: &str,
    repository_name: &str,
    source_username: &str,
    existing: &HashMap<String, String>,
) -> NameResolution {
    let target_name = resolve_target_name(owning_group, source_username, repository_name);
    let existing_address = existing.get(&target_name).cloned();

    NameResolution {
        target_name,
        existing_address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_owned_repository_keeps_bare_name() {
        assert_eq!(resolve_target_name("alice", "alice", "proj"), "proj");
    }

    #[test]
    fn test_group_owned_repository_is_qualified() {
        assert_eq!(
            resolve_target_name("team-x", "alice", "proj"),
            "team-x-proj"
        );
    }

    #[test]
    fn test_nested_group_path_flattens() {
        assert_eq!(
            resolve_target_name("team-x/infra", "alice", "proj"),
            "team-x-infra-proj"
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let first = resolve_target_name("team-x", "alice", "proj");
        let second = resolve_target_name("team-x", "alice", "proj");
        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_repository_is_reused() {
        let mut existing = HashMap::new();
        existing.insert("proj".to_string(), "git@dst.example:bob/proj.git".to_string());

        let resolution = resolve_destination("alice", "proj", "alice", &existing);
        assert_eq!(resolution.target_name, "proj");
        assert_eq!(
            resolution.existing_address.as_deref(),
            Some("git@dst.example:bob/proj.git")
        );
    }

    #[test]
    fn test_absent_repository_signals_create() {
        let existing = HashMap::new();

        let resolution = resolve_destination("team-x", "proj", "alice", &existing);
        assert_eq!(resolution.target_name, "team-x-proj");
        assert_eq!(resolution.existing_address, None);
    }
}
