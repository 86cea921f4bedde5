//! Normalization applied to a pulled manifest before it is loaded.

use serde_json::{Map, Value};

use crate::model::PromptCommit;

pub const OWNER_KEY: &str = "lc_hub_owner";
pub const REPO_KEY: &str = "lc_hub_repo";
pub const COMMIT_HASH_KEY: &str = "lc_hub_commit_hash";

/// Record provenance in the manifest and repair mustache variable names.
pub fn patch_commit(commit: &mut PromptCommit) {
    attach_provenance(
        &mut commit.manifest,
        &commit.owner,
        &commit.repo,
        &commit.commit_hash,
    );
    strip_mustache_variable_paths(&mut commit.manifest);
}

/// Merge the hub owner, repo and commit hash into `manifest.kwargs.metadata`,
/// creating `kwargs` and `metadata` when absent. Other metadata keys are kept.
pub fn attach_provenance(manifest: &mut Value, owner: &str, repo: &str, commit_hash: &str) {
    let Some(root) = manifest.as_object_mut() else {
        return;
    };

    ensure_object(root, "kwargs");
    let Some(kwargs) = root.get_mut("kwargs").and_then(Value::as_object_mut) else {
        return;
    };
    ensure_object(kwargs, "metadata");
    let Some(metadata) = kwargs.get_mut("metadata").and_then(Value::as_object_mut) else {
        return;
    };
    metadata.insert(OWNER_KEY.to_string(), owner.into());
    metadata.insert(REPO_KEY.to_string(), repo.into());
    metadata.insert(COMMIT_HASH_KEY.to_string(), commit_hash.into());
}

/// Mustache prompts may declare nested lookups like `user.name` as input
/// variables; only the top-level name is a real input. Rewrites
/// `kwargs.input_variables` and each message's
/// `kwargs.prompt.kwargs.input_variables`. Manifests in other formats, and
/// fields that are missing or not arrays, are left alone.
pub fn strip_mustache_variable_paths(manifest: &mut Value) {
    let Some(kwargs) = manifest.get_mut("kwargs").and_then(Value::as_object_mut) else {
        return;
    };
    if kwargs.get("template_format").and_then(Value::as_str) != Some("mustache") {
        return;
    }

    if let Some(vars) = kwargs.get_mut("input_variables") {
        strip_variable_paths(vars);
    }

    if let Some(Value::Array(messages)) = kwargs.get_mut("messages") {
        for message in messages {
            if let Some(vars) = message.pointer_mut("/kwargs/prompt/kwargs/input_variables") {
                strip_variable_paths(vars);
            }
        }
    }
}

fn strip_variable_paths(vars: &mut Value) {
    let Value::Array(items) = vars else {
        return;
    };
    for item in items {
        if let Value::String(name) = item {
            if let Some(idx) = name.find('.') {
                name.truncate(idx);
            }
        }
    }
}

/// Make `map[key]` an object, replacing anything else stored there.
fn ensure_object(map: &mut Map<String, Value>, key: &str) {
    if !map.get(key).is_some_and(Value::is_object) {
        map.insert(key.to_string(), Value::Object(Map::new()));
    }
}
