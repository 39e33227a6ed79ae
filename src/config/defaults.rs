//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn title() -> String {
        "".into()
    }
}

// ============================================================================
// [content] Section Defaults
// ============================================================================

pub mod content {
    use std::path::PathBuf;

    pub fn folder() -> PathBuf {
        "content".into()
    }

    pub fn languages() -> Vec<String> {
        vec!["en".into()]
    }

    pub fn extension() -> String {
        "md".into()
    }
}

// ============================================================================
// [sync] Section Defaults
// ============================================================================

pub mod sync {
    use std::path::PathBuf;

    pub fn source() -> PathBuf {
        ".".into()
    }

    pub fn interval() -> u64 {
        30
    }
}
