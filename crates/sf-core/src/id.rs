use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner shared by field and page ids.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter behind generated ids. Shared so that a field and a page
/// generated back to back never collide even with the same prefix.
static COUNTER: AtomicU64 = AtomicU64::new(1);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing one.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate a fresh id with a prefix (e.g. `text_4`, `page_2`).
            pub fn with_prefix(prefix: &str) -> Self {
                loop {
                    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                    let candidate = format!("{prefix}_{n}");
                    // Skip strings a loaded template already uses.
                    if INTERNER.get(&candidate).is_none() {
                        return Self::intern(&candidate);
                    }
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::intern(&s))
            }
        }
    };
}

interned_id! {
    /// Opaque, stable identifier of a placed field.
    /// Internally a `Spur` index: 4 bytes, Copy, Eq, O(1) hash.
    FieldId
}

interned_id! {
    /// Opaque identifier of a page within a template.
    PageId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = FieldId::intern("signature_main");
        let b = FieldId::intern("signature_main");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "signature_main");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = FieldId::with_prefix("text");
        let b = FieldId::with_prefix("text");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("text_"));
    }

    #[test]
    fn generated_ids_skip_existing_strings() {
        let n = COUNTER.load(Ordering::Relaxed);
        let taken = PageId::intern(&format!("page_{n}"));
        let fresh = PageId::with_prefix("page");
        assert_ne!(taken, fresh);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = PageId::intern("page_intro");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"page_intro\"");
        let back: PageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
