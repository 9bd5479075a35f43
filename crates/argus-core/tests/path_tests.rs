use argus_core::path::{display_name, project_id_from_root, resolve_argus_home};

#[test]
fn project_id_from_root_is_stable_and_distinct() {
    let root = "/home/user/project";
    let id = project_id_from_root(root);
    assert_eq!(id.as_str().len(), 12);

    let id2 = project_id_from_root(root);
    assert_eq!(id, id2);

    let id3 = project_id_from_root("/different/path");
    assert_ne!(id, id3);
}

#[test]
fn display_name_takes_final_segment() {
    assert_eq!(display_name("/home/j/tts"), "tts");
}

#[test]
fn resolve_argus_home_prefers_explicit_path() {
    let resolved = resolve_argus_home(Some("~/custom-argus")).unwrap();
    assert!(resolved.ends_with("custom-argus"));
}
