//! Exact-name lookup primitives shared by every idempotent creation step.
//!
//! Platform searches match substrings, so a search for `solutions` may also
//! return `solutions-old` or `my-solutions`, in any order. Both primitives
//! filter candidates with [`find_exact`] before trusting them.

use std::future::Future;

use course::{HostingError, Named};
use serde::Serialize;

/// How an object returned by a lookup primitive came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// An existing object with the exact name was found and reused.
    Found,
    /// No such object existed; it was created by this call.
    Created,
}

/// Returns the first candidate whose name equals `name` exactly.
pub fn find_exact<T: Named>(candidates: impl IntoIterator<Item = T>, name: &str) -> Option<T> {
    candidates.into_iter().find(|candidate| candidate.name() == name)
}

/// Searches first and creates only if no exact match exists.
///
/// Used where the object is expected to exist on most runs (the solutions
/// group and reference project).
pub async fn find_or_create<T, S, C, F>(
    name: &str,
    search: S,
    create: C,
) -> Result<(T, Resolution), HostingError>
where
    T: Named,
    S: Future<Output = Result<Vec<T>, HostingError>>,
    C: FnOnce() -> F,
    F: Future<Output = Result<T, HostingError>>,
{
    if let Some(existing) = find_exact(search.await?, name) {
        return Ok((existing, Resolution::Found));
    }
    Ok((create().await?, Resolution::Created))
}

/// Creates first and, on an already-exists failure, adopts the exact match
/// found by re-searching.
///
/// If the collision cannot be explained by an exact match, the original
/// creation error is returned unchanged. Any other creation failure is
/// returned without searching.
pub async fn create_or_adopt<T, C, S, F>(
    name: &str,
    create: C,
    search: S,
) -> Result<(T, Resolution), HostingError>
where
    T: Named,
    C: Future<Output = Result<T, HostingError>>,
    S: FnOnce() -> F,
    F: Future<Output = Result<Vec<T>, HostingError>>,
{
    match create.await {
        Ok(created) => Ok((created, Resolution::Created)),
        Err(e) if e.is_already_exists() => match find_exact(search().await?, name) {
            Some(existing) => Ok((existing, Resolution::Found)),
            None => Err(e),
        },
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use course::HostingErrorKind;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str);

    impl Named for Item {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn fuzzy_results() -> Vec<Item> {
        vec![Item("solutions-old"), Item("my-solutions"), Item("solutions")]
    }

    #[test]
    fn find_exact_ignores_substring_matches() {
        assert_eq!(find_exact(fuzzy_results(), "solutions"), Some(Item("solutions")));
        assert_eq!(find_exact(vec![Item("solutions-old")], "solutions"), None);
    }

    #[tokio::test]
    async fn find_or_create_reuses_exact_match() {
        let created = Cell::new(false);
        let flag = &created;
        let (item, resolution) = find_or_create(
            "solutions",
            async { Ok(fuzzy_results()) },
            || async move {
                flag.set(true);
                Ok(Item("solutions"))
            },
        )
        .await
        .unwrap();

        assert_eq!(item, Item("solutions"));
        assert_eq!(resolution, Resolution::Found);
        assert!(!created.get());
    }

    #[tokio::test]
    async fn find_or_create_creates_when_only_fuzzy_matches_exist() {
        let (item, resolution) = find_or_create(
            "solutions",
            async { Ok(vec![Item("my-solutions")]) },
            || async { Ok(Item("solutions")) },
        )
        .await
        .unwrap();

        assert_eq!(item, Item("solutions"));
        assert_eq!(resolution, Resolution::Created);
    }

    #[tokio::test]
    async fn create_or_adopt_adopts_on_collision() {
        let (item, resolution) = create_or_adopt(
            "alice",
            async { Err(HostingError::create(HostingErrorKind::AlreadyExists, "taken")) },
            || async { Ok(vec![Item("alice2"), Item("alice")]) },
        )
        .await
        .unwrap();

        assert_eq!(item, Item("alice"));
        assert_eq!(resolution, Resolution::Found);
    }

    #[tokio::test]
    async fn create_or_adopt_returns_original_error_when_nothing_matches() {
        let err = create_or_adopt(
            "alice",
            async { Err::<Item, _>(HostingError::create(HostingErrorKind::AlreadyExists, "taken")) },
            || async { Ok(vec![Item("alice2")]) },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, HostingErrorKind::AlreadyExists);
        assert_eq!(err.message, "taken");
    }

    #[tokio::test]
    async fn create_or_adopt_does_not_search_on_other_failures() {
        let searched = Cell::new(false);
        let flag = &searched;
        let err = create_or_adopt(
            "alice",
            async { Err::<Item, _>(HostingError::create(HostingErrorKind::PermissionDenied, "no")) },
            || async move {
                flag.set(true);
                Ok(vec![Item("alice")])
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, HostingErrorKind::PermissionDenied);
        assert!(!searched.get());
    }
}
