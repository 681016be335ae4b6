//! Recipient resolution: from a notification subject to the set of user ids
//! entitled to hear about it.
//!
//! All resolvers return a set; an empty set is a terminal no-op outcome for
//! the caller, never an error.

use std::collections::HashSet;

use marinex_store::{BoatRow, StoreClient, StoreError};

/// Owners of one boat: the primary owner plus any co-owners, with null and
/// empty ids filtered out.
pub fn resolve_boat_owners(boat: &BoatRow) -> HashSet<String> {
    let mut ids = HashSet::new();
    if let Some(owner) = boat.primary_owner_id.as_deref().filter(|id| !id.is_empty()) {
        ids.insert(owner.to_string());
    }
    if let Some(co_owners) = &boat.co_owner_ids {
        for owner in co_owners.iter().flatten() {
            if !owner.is_empty() {
                ids.insert(owner.clone());
            }
        }
    }
    ids
}

/// Union of owner sets across every boat of a marina.
pub fn resolve_marina_boat_owners(boats: &[BoatRow]) -> HashSet<String> {
    let mut ids = HashSet::new();
    for boat in boats {
        ids.extend(resolve_boat_owners(boat));
    }
    ids
}

/// Users holding the marina staff role for the given marina.
pub async fn resolve_marina_staff(
    store: &StoreClient,
    marina_id: &str,
) -> Result<HashSet<String>, StoreError> {
    let profiles = store.marina_staff(marina_id).await?;
    Ok(profiles
        .into_iter()
        .filter_map(|profile| profile.user_id)
        .filter(|id| !id.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boat(primary: Option<&str>, co_owners: Option<Vec<Option<&str>>>) -> BoatRow {
        BoatRow {
            id: Some("b-1".to_string()),
            name: Some("Albatroz".to_string()),
            marina_name: Some("Marina Azul".to_string()),
            primary_owner_id: primary.map(str::to_string),
            co_owner_ids: co_owners
                .map(|ids| ids.into_iter().map(|id| id.map(str::to_string)).collect()),
        }
    }

    #[test]
    fn owners_include_primary_and_co_owners_without_nulls() {
        let boat = boat(Some("u-1"), Some(vec![Some("u-2"), None, Some(""), Some("u-1")]));
        let owners = resolve_boat_owners(&boat);
        assert_eq!(owners.len(), 2);
        assert!(owners.contains("u-1"));
        assert!(owners.contains("u-2"));
    }

    #[test]
    fn boat_without_owners_resolves_to_empty_set() {
        assert!(resolve_boat_owners(&boat(None, None)).is_empty());
    }

    #[test]
    fn marina_owners_are_the_union_across_boats() {
        let boats = vec![
            boat(Some("u-1"), Some(vec![Some("u-2")])),
            boat(Some("u-2"), Some(vec![Some("u-3")])),
            boat(None, None),
        ];
        let owners = resolve_marina_boat_owners(&boats);
        assert_eq!(owners.len(), 3);
    }
}
