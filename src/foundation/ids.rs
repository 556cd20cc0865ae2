/// Generate a fresh layer/scene identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Return `id` when it is present and non-blank, otherwise a freshly generated one.
pub fn id_or_new(id: Option<&str>) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => new_id(),
    }
}
