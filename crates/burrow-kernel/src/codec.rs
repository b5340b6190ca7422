//! The environment codec: load and save the whole world as JSON.
//!
//! A document has three top-level sections: `vars` (name to text),
//! `perms` (role name to permission tokens, declaration order carrying
//! priority), and `struct` (the recursive folder/file tree). `struct`
//! is required; the others are optional.
//!
//! Loading is lenient about optional attributes: a bad availability
//! window or a missing lock key is logged and replaced with a safe
//! default, so one corrupt attribute never aborts an otherwise valid
//! load. A missing `struct` section or an unknown element kind is
//! fatal. Saving emits children in lexicographic order, so two saves of
//! the same environment are byte-identical.

use burrow_types::{Error, Result, TIMESTAMP_HINT};
use serde_json::{Map, Value as Json};

use crate::env::Environment;
use crate::perms::PermissionTable;
use crate::vars::VariableStore;
use crate::vfs::{gate, Access, File, Folder, Window};

const VARS_SECTION: &str = "vars";
const PERMS_SECTION: &str = "perms";
const STRUCT_SECTION: &str = "struct";

const TYPE_ATTR: &str = "type";
const FOLDER_KIND: &str = "folder";
const FILE_KIND: &str = "file";
const CHILDREN_ATTR: &str = "children";
const AVAILABLE_ATTR: &str = "availableBetween";
const LOCKED_ATTR: &str = "locked";
const KEY_ATTR: &str = "key";
const CACHE_ATTR: &str = "cache";
const DATA_ATTR: &str = "data";

/// Substituted when a node claims `locked: true` but carries no key.
const DEFAULT_LOCK_KEY: &str = "admin";

/// Parse an environment document.
///
/// Returns a complete, freshly built [`Environment`]; on any error the
/// caller's previous environment is untouched.
pub fn parse(source: &str) -> Result<Environment> {
    let doc: Json =
        serde_json::from_str(source).map_err(|e| Error::Malformed(e.to_string()))?;
    let doc = doc
        .as_object()
        .ok_or_else(|| Error::Malformed("the top level must be an object".to_string()))?;

    let mut vars = VariableStore::new();
    if let Some(section) = doc.get(VARS_SECTION) {
        load_vars(section, &mut vars);
    }

    let mut perms = PermissionTable::new();
    if let Some(section) = doc.get(PERMS_SECTION) {
        load_perms(section, &mut perms);
    }

    let tree = doc.get(STRUCT_SECTION).ok_or_else(|| {
        Error::Malformed("could not find the directory structure section".to_string())
    })?;
    let tree = tree
        .as_object()
        .ok_or_else(|| Error::Malformed("the directory structure must be an object".to_string()))?;

    let mut root = Folder::root();
    load_children(tree, &mut root)?;

    Ok(Environment { root, vars, perms })
}

fn load_vars(section: &Json, vars: &mut VariableStore) {
    let Some(map) = section.as_object() else {
        tracing::warn!("the vars section is not an object; ignoring it");
        return;
    };
    for (name, value) in map {
        let Some(text) = value.as_str() else {
            tracing::warn!("skipping variable \"{name}\": value is not a string");
            continue;
        };
        // Collides with a pre-seeded variable? Skip it, keep loading.
        if let Err(err) = vars.create(name, text) {
            tracing::warn!("skipping variable \"{name}\": {err}");
        }
    }
}

fn load_perms(section: &Json, perms: &mut PermissionTable) {
    let Some(map) = section.as_object() else {
        tracing::warn!("the perms section is not an object; ignoring it");
        return;
    };
    // Iteration order is the document's declaration order, which fixes
    // each role's position in the priority list.
    for (role, value) in map {
        let Some(tokens) = value.as_array() else {
            tracing::warn!("skipping role \"{role}\": grants are not an array");
            continue;
        };
        let tokens = tokens
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect();
        perms.declare(role, tokens);
    }
}

fn load_children(map: &Map<String, Json>, parent: &mut Folder) -> Result<()> {
    for (name, value) in map {
        let path = format!("{}{}", parent.child_prefix(), name);
        let Some(element) = value.as_object() else {
            return Err(Error::UnknownElementKind { path, kind: String::new() });
        };
        let kind = element.get(TYPE_ATTR).and_then(Json::as_str).unwrap_or("");

        match kind {
            FOLDER_KIND => {
                let mut folder = Folder::new(name.clone(), parent.child_prefix());
                folder.access = load_access(element, &path);
                if let Some(children) = element.get(CHILDREN_ATTR) {
                    match children.as_object() {
                        Some(children) => load_children(children, &mut folder)?,
                        None => tracing::warn!(
                            "children of \"{path}\" is not an object; treating it as empty"
                        ),
                    }
                }
                parent.insert_folder(folder);
            }
            FILE_KIND => {
                let mut file = File::new(name.clone(), parent.child_prefix());
                file.access = load_access(element, &path);
                if let Some(cache) = element.get(CACHE_ATTR).and_then(Json::as_str) {
                    file.cache = Some(cache.to_string());
                }
                if let Some(data) = element.get(DATA_ATTR).and_then(Json::as_str) {
                    file.data = data.to_string();
                }
                parent.insert_file(file);
            }
            other => {
                return Err(Error::UnknownElementKind { path, kind: other.to_string() });
            }
        }
    }
    Ok(())
}

fn load_access(element: &Map<String, Json>, path: &str) -> Access {
    let mut window = Window::always();
    if let Some(raw) = element.get(AVAILABLE_ATTR) {
        let endpoints: Vec<String> = raw
            .as_array()
            .map(|arr| {
                arr.iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        // Malformed literals are logged but kept; they fail closed at
        // evaluation time instead.
        for endpoint in &endpoints {
            if endpoint != gate::WILDCARD && gate::parse_timestamp(endpoint).is_err() {
                tracing::warn!(
                    "invalid time \"{endpoint}\" on \"{path}\": expected {TIMESTAMP_HINT}; keeping it as written"
                );
            }
        }
        if endpoints.len() == 2 {
            window = Window::new(endpoints[0].clone(), endpoints[1].clone());
        } else {
            tracing::warn!(
                "availableBetween on \"{path}\" must have exactly two entries; falling back to always open"
            );
        }
    }

    let locked = element.get(LOCKED_ATTR).and_then(Json::as_bool).unwrap_or(false);
    let mut key = String::new();
    if locked {
        match element.get(KEY_ATTR).and_then(Json::as_str) {
            Some(k) if !k.is_empty() => key = k.to_string(),
            _ => {
                tracing::warn!(
                    "\"{path}\" is locked but carries no usable key; substituting the default"
                );
                key = DEFAULT_LOCK_KEY.to_string();
            }
        }
    }

    Access { window, locked, key }
}

/// Serialize an environment.
///
/// Immutable variables are omitted (so `version` never round-trips),
/// roles are written in priority order (so priority survives a
/// round trip), and tree children are written in lexicographic order.
/// An empty permission table means the world is open, which is the
/// absent-section default, so no `perms` section is written for it.
pub fn serialize(env: &Environment) -> Result<String> {
    let mut doc = Map::new();
    doc.insert(VARS_SECTION.to_string(), vars_json(&env.vars));
    if !env.perms.is_empty() {
        doc.insert(PERMS_SECTION.to_string(), perms_json(&env.perms));
    }
    doc.insert(STRUCT_SECTION.to_string(), children_json(&env.root));
    serde_json::to_string_pretty(&Json::Object(doc)).map_err(|e| Error::Malformed(e.to_string()))
}

fn vars_json(vars: &VariableStore) -> Json {
    let mut map = Map::new();
    for variable in vars.iter().filter(|v| !v.immutable) {
        map.insert(variable.name.clone(), Json::String(variable.raw_value()));
    }
    Json::Object(map)
}

fn perms_json(perms: &PermissionTable) -> Json {
    let mut map = Map::new();
    for role in perms.roles() {
        let tokens = perms.grants_of(role).unwrap_or_default();
        map.insert(
            role.clone(),
            Json::Array(tokens.iter().map(|t| Json::String(t.clone())).collect()),
        );
    }
    Json::Object(map)
}

fn children_json(folder: &Folder) -> Json {
    let mut map = Map::new();
    for sub in folder.folders.values() {
        map.insert(sub.name.clone(), folder_json(sub));
    }
    for file in folder.files.values() {
        map.insert(file.name.clone(), file_json(file));
    }
    Json::Object(map)
}

fn access_attrs(access: &Access, out: &mut Map<String, Json>) {
    if !access.window.is_always() {
        out.insert(
            AVAILABLE_ATTR.to_string(),
            Json::Array(vec![
                Json::String(access.window.start.clone()),
                Json::String(access.window.end.clone()),
            ]),
        );
    }
    if access.locked {
        out.insert(LOCKED_ATTR.to_string(), Json::Bool(true));
        out.insert(KEY_ATTR.to_string(), Json::String(access.key.clone()));
    }
}

fn folder_json(folder: &Folder) -> Json {
    let mut map = Map::new();
    map.insert(TYPE_ATTR.to_string(), Json::String(FOLDER_KIND.to_string()));
    access_attrs(&folder.access, &mut map);
    map.insert(CHILDREN_ATTR.to_string(), children_json(folder));
    Json::Object(map)
}

fn file_json(file: &File) -> Json {
    let mut map = Map::new();
    map.insert(TYPE_ATTR.to_string(), Json::String(FILE_KIND.to_string()));
    access_attrs(&file.access, &mut map);
    if let Some(cache) = &file.cache {
        map.insert(CACHE_ATTR.to_string(), Json::String(cache.clone()));
    }
    if !file.data.is_empty() || file.cache.is_none() {
        map.insert(DATA_ATTR.to_string(), Json::String(file.data.clone()));
    }
    Json::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::TIME_VARIABLE;
    use crate::vfs::tree;

    const SAMPLE: &str = r#"{
        "vars": {"motd": "welcome", "time": "600"},
        "perms": {
            "admin": ["*"],
            "everyone": ["pwd", "ls", "cat"]
        },
        "struct": {
            "docs": {
                "type": "folder",
                "children": {
                    "readme": {"type": "file", "data": "hello"}
                }
            },
            "vault": {
                "type": "folder",
                "locked": true,
                "key": "key1",
                "children": {}
            },
            "note": {"type": "file", "data": "root level"}
        }
    }"#;

    #[test]
    fn test_parse_sample() {
        let env = parse(SAMPLE).unwrap();

        assert_eq!(env.vars.get("motd").unwrap(), "welcome");
        // "time" collides with the pre-seeded clock and is skipped
        let time = env.vars.iter().find(|v| v.name == TIME_VARIABLE).unwrap();
        assert_eq!(time.raw_value(), "0");

        assert_eq!(env.perms.roles(), ["admin", "everyone"]);

        let readme = tree::lookup_file(&env.root, "/docs/readme").unwrap();
        assert_eq!(readme.data, "hello");
        assert_eq!(readme.prefix, "/docs/");

        let vault = env.root.folders.get("vault").unwrap();
        assert!(vault.access.locked);
        assert_eq!(vault.access.key, "key1");

        assert_eq!(env.root.files.get("note").unwrap().data, "root level");
    }

    #[test]
    fn test_missing_struct_is_fatal() {
        assert!(matches!(
            parse(r#"{"vars": {}}"#),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(parse("{nope"), Err(Error::Malformed(_))));
        assert!(matches!(parse("[1, 2]"), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_unknown_element_kind_names_path() {
        let doc = r#"{"struct": {"docs": {"type": "folder", "children": {
            "weird": {"type": "socket"}
        }}}}"#;
        match parse(doc) {
            Err(Error::UnknownElementKind { path, kind }) => {
                assert_eq!(path, "/docs/weird");
                assert_eq!(kind, "socket");
            }
            other => panic!("expected UnknownElementKind, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_type_is_unknown_kind() {
        let doc = r#"{"struct": {"thing": {}}}"#;
        assert!(matches!(parse(doc), Err(Error::UnknownElementKind { .. })));
    }

    #[test]
    fn test_short_window_falls_back_to_always() {
        let doc = r#"{"struct": {"docs": {
            "type": "folder",
            "availableBetween": ["2024-01-01 00:00:00"],
            "children": {}
        }}}"#;
        let env = parse(doc).unwrap();
        assert!(env.root.folders.get("docs").unwrap().access.window.is_always());
    }

    #[test]
    fn test_malformed_window_literal_is_kept() {
        let doc = r#"{"struct": {"docs": {
            "type": "folder",
            "availableBetween": ["whenever", "*"],
            "children": {}
        }}}"#;
        let env = parse(doc).unwrap();
        let window = &env.root.folders.get("docs").unwrap().access.window;
        assert_eq!(window.start, "whenever");
        // Kept at load time, fails closed at evaluation time
        assert!(!window.is_open());
    }

    #[test]
    fn test_locked_without_key_gets_default() {
        let doc = r#"{"struct": {"vault": {
            "type": "folder",
            "locked": true,
            "children": {}
        }}}"#;
        let env = parse(doc).unwrap();
        let vault = env.root.folders.get("vault").unwrap();
        assert!(vault.access.locked);
        assert_eq!(vault.access.key, DEFAULT_LOCK_KEY);
    }

    #[test]
    fn test_cache_and_data_both_loaded() {
        let doc = r#"{"struct": {"f": {
            "type": "file",
            "cache": "/tmp/elsewhere",
            "data": "inline wins"
        }}}"#;
        let env = parse(doc).unwrap();
        let file = env.root.files.get("f").unwrap();
        assert_eq!(file.cache.as_deref(), Some("/tmp/elsewhere"));
        assert_eq!(file.data, "inline wins");
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let env = parse(SAMPLE).unwrap();
        let first = serialize(&env).unwrap();
        let second = serialize(&env).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_perms_section_omitted() {
        let doc = r#"{"struct": {"note": {"type": "file", "data": "x"}}}"#;
        let env = parse(doc).unwrap();
        assert!(env.perms.is_empty());

        let saved = serialize(&env).unwrap();
        assert!(!saved.contains(PERMS_SECTION));
        assert!(parse(&saved).unwrap().perms.is_empty());
    }

    #[test]
    fn test_immutable_vars_omitted_from_save() {
        let env = parse(SAMPLE).unwrap();
        let saved = serialize(&env).unwrap();
        assert!(!saved.contains("version"));
        assert!(saved.contains("motd"));
    }

    #[test]
    fn test_round_trip_preserves_tree_and_priority() {
        let env = parse(SAMPLE).unwrap();
        let saved = serialize(&env).unwrap();
        let again = parse(&saved).unwrap();

        assert_eq!(again.perms.roles(), ["admin", "everyone"]);

        let vault = again.root.folders.get("vault").unwrap();
        assert!(vault.access.locked);
        assert_eq!(vault.access.key, "key1");

        let readme = tree::lookup_file(&again.root, "/docs/readme").unwrap();
        assert_eq!(readme.data, "hello");
        assert_eq!(again.root.files.get("note").unwrap().data, "root level");
    }
}
