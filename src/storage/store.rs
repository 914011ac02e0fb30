//! The record store: soldiers and requests mirrored into a [`BlobStore`].
//!
//! Every mutation serializes the whole affected collection and writes it
//! back. The new collection is written before the in-memory copy is
//! replaced, so a failed write leaves the store as it was.

use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    domain::{
        NewSoldier, Request, RequestDraft, RequestFilter, RequestId, RequestStatus, RequestView,
        Soldier, SoldierId, ValidationError,
        filter::{distinct_departments, filter_requests, find_soldier},
        message,
    },
    storage::{
        blob::{BlobError, BlobStore},
        seed::default_soldiers,
    },
};

/// Blob key of the soldier collection.
pub const SOLDIERS_KEY: &str = "soldiers_data";

/// Blob key of the request collection.
pub const REQUESTS_KEY: &str = "requests_data";

/// Errors returned by [`Store`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The submitted data was incomplete. Nothing was changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The blob store could not be read or written.
    #[error(transparent)]
    Blob(#[from] BlobError),
    /// A stored collection is not valid JSON for its record type.
    #[error("failed to parse stored '{key}'")]
    Parse {
        /// The blob key that failed to parse.
        key: &'static str,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A collection could not be serialized.
    #[error("failed to serialize '{key}'")]
    Serialize {
        /// The blob key being written.
        key: &'static str,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// In-memory soldier and request collections, kept in sync with a blob store.
#[derive(Debug)]
pub struct Store<B> {
    blob: B,
    soldiers: Vec<Soldier>,
    requests: Vec<Request>,
}

impl<B: BlobStore> Store<B> {
    /// Loads both collections from `blob`.
    ///
    /// If no soldier collection is stored yet, the built-in default soldiers
    /// are written and used. A missing request collection is treated as
    /// empty and is not written.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob store cannot be read, a stored collection
    /// cannot be parsed, or the default soldiers cannot be written.
    #[instrument(level = "debug", skip_all)]
    pub fn open(mut blob: B) -> Result<Self, StoreError> {
        let soldiers = if let Some(soldiers) = load(&blob, SOLDIERS_KEY)? {
            soldiers
        } else {
            let seed = default_soldiers()?;
            tracing::debug!("No stored soldiers, seeding {} defaults", seed.len());
            persist(&mut blob, SOLDIERS_KEY, &seed)?;
            seed
        };

        let requests = load(&blob, REQUESTS_KEY)?.unwrap_or_default();

        tracing::debug!(
            "Loaded {} soldiers and {} requests",
            soldiers.len(),
            requests.len()
        );

        Ok(Self {
            blob,
            soldiers,
            requests,
        })
    }

    /// All soldiers, in the order they were added.
    #[must_use]
    pub fn soldiers(&self) -> &[Soldier] {
        &self.soldiers
    }

    /// All requests, in the order they were added.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Finds a soldier by identifier.
    #[must_use]
    pub fn soldier(&self, id: &SoldierId) -> Option<&Soldier> {
        find_soldier(&self.soldiers, id)
    }

    /// Finds a request by identifier.
    #[must_use]
    pub fn request(&self, id: &RequestId) -> Option<&Request> {
        self.requests.iter().find(|request| &request.id == id)
    }

    /// The underlying blob store.
    #[must_use]
    pub const fn blob(&self) -> &B {
        &self.blob
    }

    /// Consumes the store, returning the underlying blob store.
    #[must_use]
    pub fn into_blob(self) -> B {
        self.blob
    }

    /// Adds a soldier, assigning it a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the full name, personal number
    /// or ID number is empty, or an error if the collection cannot be
    /// persisted. In both cases the store is unchanged.
    #[instrument(level = "debug", skip_all)]
    pub fn add_soldier(&mut self, new_soldier: NewSoldier) -> Result<&Soldier, StoreError> {
        new_soldier.validate()?;

        let id = SoldierId::new(fresh_id(|id| {
            self.soldiers.iter().any(|soldier| soldier.id.as_str() == id)
        }));
        let soldier = new_soldier.into_soldier(id)?;

        let mut updated = self.soldiers.clone();
        updated.push(soldier);
        persist(&mut self.blob, SOLDIERS_KEY, &updated)?;
        self.soldiers = updated;

        let soldier = &self.soldiers[self.soldiers.len() - 1];
        tracing::info!("Added soldier {} ({})", soldier.full_name, soldier.id);
        Ok(soldier)
    }

    /// Renders the message for `draft`.
    ///
    /// # Errors
    ///
    /// Returns an error if the commander name is empty or the draft's
    /// soldier does not exist.
    pub fn generate_message(&self, draft: &RequestDraft) -> Result<String, ValidationError> {
        draft.validate()?;
        let soldier = self
            .soldier(&draft.soldier_id)
            .ok_or_else(|| ValidationError::UnknownSoldier(draft.soldier_id.clone()))?;
        Ok(message::generate_message(draft, soldier))
    }

    /// Saves a request with its rendered message. The request starts out
    /// [pending](RequestStatus::Pending).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the commander name or message is
    /// empty or the soldier does not exist, or an error if the collection
    /// cannot be persisted. In both cases the store is unchanged.
    #[instrument(level = "debug", skip_all)]
    pub fn add_request(
        &mut self,
        draft: RequestDraft,
        message: String,
    ) -> Result<&Request, StoreError> {
        draft.validate()?;
        if self.soldier(&draft.soldier_id).is_none() {
            return Err(ValidationError::UnknownSoldier(draft.soldier_id).into());
        }
        if message.trim().is_empty() {
            return Err(ValidationError::MissingMessage.into());
        }

        let id = RequestId::new(fresh_id(|id| {
            self.requests.iter().any(|request| request.id.as_str() == id)
        }));
        let request = Request::from_draft(id, draft, message);

        let mut updated = self.requests.clone();
        updated.push(request);
        persist(&mut self.blob, REQUESTS_KEY, &updated)?;
        self.requests = updated;

        let request = &self.requests[self.requests.len() - 1];
        tracing::info!(
            "Added {} request {} for soldier {}",
            request.kind.type_name(),
            request.id,
            request.soldier_id
        );
        Ok(request)
    }

    /// Sets the status of a request.
    ///
    /// Returns `false`, without touching the store, if no request has the
    /// given identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted.
    #[instrument(level = "debug", skip(self))]
    pub fn update_request_status(
        &mut self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<bool, StoreError> {
        let updated = self.update_request(id, |request| request.status = status)?;
        if updated {
            tracing::info!("Request {id} is now {status}");
        }
        Ok(updated)
    }

    /// Replaces the message text of a request.
    ///
    /// Returns `false`, without touching the store, if no request has the
    /// given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the message is empty, or an
    /// error if the collection cannot be persisted.
    #[instrument(level = "debug", skip(self, message))]
    pub fn update_request_message(
        &mut self,
        id: &RequestId,
        message: String,
    ) -> Result<bool, StoreError> {
        if message.trim().is_empty() {
            return Err(ValidationError::MissingMessage.into());
        }
        let updated = self.update_request(id, |request| request.message = message)?;
        if updated {
            tracing::info!("Updated message of request {id}");
        }
        Ok(updated)
    }

    /// Requests matching `filter`, paired with their soldiers.
    #[must_use]
    pub fn filter_requests(&self, filter: &RequestFilter) -> Vec<RequestView<'_>> {
        filter_requests(&self.requests, &self.soldiers, filter)
    }

    /// The department filter options for the current requests.
    #[must_use]
    pub fn departments(&self) -> Vec<&str> {
        distinct_departments(&self.requests, &self.soldiers)
    }

    fn update_request(
        &mut self,
        id: &RequestId,
        change: impl FnOnce(&mut Request),
    ) -> Result<bool, StoreError> {
        let Some(index) = self.requests.iter().position(|request| &request.id == id) else {
            tracing::debug!("No request with id {id}");
            return Ok(false);
        };

        let mut updated = self.requests.clone();
        change(&mut updated[index]);
        persist(&mut self.blob, REQUESTS_KEY, &updated)?;
        self.requests = updated;
        Ok(true)
    }
}

fn load<T: DeserializeOwned>(
    blob: &impl BlobStore,
    key: &'static str,
) -> Result<Option<Vec<T>>, StoreError> {
    let Some(content) = blob.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::Parse { key, source })
}

fn persist<T: Serialize>(
    blob: &mut impl BlobStore,
    key: &'static str,
    records: &[T],
) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(records)
        .map_err(|source| StoreError::Serialize { key, source })?;
    blob.write(key, &content)?;
    Ok(())
}

/// A random identifier that `taken` does not report as in use.
fn fresh_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !taken(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::{
        domain::{ReplacedSoldier, RequestKind, StatusFilter},
        storage::blob::MemoryStore,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn open() -> Store<MemoryStore> {
        Store::open(MemoryStore::new()).unwrap()
    }

    fn new_soldier(name: &str) -> NewSoldier {
        NewSoldier {
            full_name: name.to_string(),
            personal_number: "7654321".to_string(),
            id_number: "987654321".to_string(),
            rank: "סמל".to_string(),
            department: "לוגיסטיקה".to_string(),
            position: "נהג".to_string(),
            ..NewSoldier::default()
        }
    }

    fn single_day_draft(soldier_id: &SoldierId) -> RequestDraft {
        RequestDraft {
            soldier_id: soldier_id.clone(),
            commander_name: "אבי מזרחי".to_string(),
            kind: RequestKind::SingleDay {
                arrival_date: date(2026, 10, 20),
                base_name: "בסיס צפון".to_string(),
                was_in_base_before: false,
                requires_approval: true,
            },
        }
    }

    /// A blob store whose writes always fail.
    #[derive(Default)]
    struct ReadOnlyStore(MemoryStore);

    impl BlobStore for ReadOnlyStore {
        fn read(&self, key: &str) -> Result<Option<String>, BlobError> {
            self.0.read(key)
        }

        fn write(&mut self, key: &str, _value: &str) -> Result<(), BlobError> {
            Err(BlobError::Io {
                path: key.into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn empty_blob_is_seeded_with_two_soldiers() {
        let store = open();
        assert_eq!(store.soldiers().len(), 2);
        assert!(store.requests().is_empty());

        let blob = store.into_blob();
        assert!(blob.get(SOLDIERS_KEY).is_some());
        assert!(blob.get(REQUESTS_KEY).is_none());
    }

    #[test]
    fn existing_soldiers_are_not_reseeded() {
        let mut blob = MemoryStore::new();
        blob.insert(SOLDIERS_KEY, "[]");

        let store = Store::open(blob).unwrap();
        assert!(store.soldiers().is_empty());
    }

    #[test]
    fn corrupt_collection_is_reported() {
        let mut blob = MemoryStore::new();
        blob.insert(REQUESTS_KEY, "{not json");

        let error = Store::open(blob).unwrap_err();
        assert!(matches!(
            error,
            StoreError::Parse {
                key: REQUESTS_KEY,
                ..
            }
        ));
    }

    #[test]
    fn add_soldier_appends_and_is_retrievable() {
        let mut store = open();
        let before = store.soldiers().len();

        let id = store.add_soldier(new_soldier("דנה רוט")).unwrap().id.clone();

        assert_eq!(store.soldiers().len(), before + 1);
        assert_eq!(
            store.soldier(&id).unwrap().full_name.as_str(),
            "דנה רוט"
        );
    }

    #[test]
    fn add_soldier_persists_full_collection() {
        let mut store = open();
        store.add_soldier(new_soldier("דנה רוט")).unwrap();

        let reopened = Store::open(store.into_blob()).unwrap();
        assert_eq!(reopened.soldiers().len(), 3);
    }

    #[test]
    fn add_soldier_assigns_unique_ids() {
        let mut store = open();
        for i in 0..20 {
            store.add_soldier(new_soldier(&format!("חייל {i}"))).unwrap();
        }
        let ids: HashSet<_> = store.soldiers().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), store.soldiers().len());
    }

    #[test]
    fn add_soldier_with_missing_field_changes_nothing() {
        let clears: [fn(&mut NewSoldier); 3] = [
            |s: &mut NewSoldier| s.full_name.clear(),
            |s: &mut NewSoldier| s.personal_number.clear(),
            |s: &mut NewSoldier| s.id_number.clear(),
        ];
        for clear in clears {
            let mut store = open();
            let before = store.soldiers().to_vec();
            let mut draft = new_soldier("דנה רוט");
            clear(&mut draft);

            let error = store.add_soldier(draft).unwrap_err();
            assert!(matches!(error, StoreError::Validation(_)));
            assert_eq!(store.soldiers(), before.as_slice());
        }
    }

    #[test]
    fn failed_write_leaves_store_unchanged() {
        let mut seeded = MemoryStore::new();
        seeded.insert(SOLDIERS_KEY, "[]");
        let mut store = Store::open(ReadOnlyStore(seeded)).unwrap();

        let error = store.add_soldier(new_soldier("דנה רוט")).unwrap_err();
        assert!(matches!(error, StoreError::Blob(_)));
        assert!(store.soldiers().is_empty());
    }

    #[test]
    fn every_variant_is_saved_pending_with_message() {
        let mut store = open();
        let yossi = SoldierId::new("1");
        let sara = store.soldier(&SoldierId::new("2")).unwrap().clone();

        let kinds = [
            RequestKind::SingleDay {
                arrival_date: date(2026, 1, 1),
                base_name: "בסיס צפון".to_string(),
                was_in_base_before: false,
                requires_approval: true,
            },
            RequestKind::MultiDay {
                arrival_date: date(2026, 1, 1),
                departure_date: date(2026, 1, 3),
                base_name: "בסיס צפון".to_string(),
                was_in_base_before: true,
                requires_approval: false,
            },
            RequestKind::Replacement {
                arrival_date: date(2026, 1, 1),
                departure_date: date(2026, 1, 9),
                base_name: "בסיס צפון".to_string(),
                was_in_base_before: false,
                requires_approval: false,
                replaced_soldier: ReplacedSoldier::snapshot(&sara, date(2026, 1, 2)),
            },
            RequestKind::Departure {
                base_name: "בסיס צפון".to_string(),
            },
        ];

        for kind in kinds {
            let draft = RequestDraft {
                soldier_id: yossi.clone(),
                commander_name: "אבי מזרחי".to_string(),
                kind,
            };
            let message = store.generate_message(&draft).unwrap();
            let request = store.add_request(draft, message).unwrap();
            assert!(!request.message.is_empty());
            assert_eq!(request.status, RequestStatus::Pending);
        }

        assert_eq!(store.requests().len(), 4);
    }

    #[test]
    fn scenario_single_day_message_lines() {
        let store = open();
        let message = store
            .generate_message(&single_day_draft(&SoldierId::new("1")))
            .unwrap();
        let lines: Vec<_> = message.lines().collect();
        assert!(lines.contains(&"בסיס: בסיס צפון"));
        assert!(lines.contains(&"היה בבסיס בעבר: לא"));
        assert!(lines.contains(&"דורש אישור: כן"));
    }

    #[test]
    fn generate_message_requires_known_soldier() {
        let store = open();
        let draft = single_day_draft(&SoldierId::new("missing"));
        assert_eq!(
            store.generate_message(&draft),
            Err(ValidationError::UnknownSoldier(SoldierId::new("missing")))
        );
    }

    #[test]
    fn add_request_without_message_is_rejected() {
        let mut store = open();
        let error = store
            .add_request(single_day_draft(&SoldierId::new("1")), "  ".to_string())
            .unwrap_err();
        assert!(matches!(
            error,
            StoreError::Validation(ValidationError::MissingMessage)
        ));
        assert!(store.requests().is_empty());
    }

    #[test]
    fn add_request_without_commander_is_rejected() {
        let mut store = open();
        let mut draft = single_day_draft(&SoldierId::new("1"));
        draft.commander_name.clear();
        let error = store.add_request(draft, "text".to_string()).unwrap_err();
        assert!(matches!(
            error,
            StoreError::Validation(ValidationError::MissingCommander)
        ));
    }

    #[test]
    fn update_status_changes_only_the_target() {
        let mut store = open();
        let draft = single_day_draft(&SoldierId::new("1"));
        let first = store
            .add_request(draft.clone(), "one".to_string())
            .unwrap()
            .id
            .clone();
        let second = store
            .add_request(draft, "two".to_string())
            .unwrap()
            .id
            .clone();

        assert!(store
            .update_request_status(&first, RequestStatus::Approved)
            .unwrap());

        assert_eq!(store.request(&first).unwrap().status, RequestStatus::Approved);
        assert_eq!(store.request(&second).unwrap().status, RequestStatus::Pending);

        let reopened = Store::open(store.into_blob()).unwrap();
        assert_eq!(
            reopened.request(&first).unwrap().status,
            RequestStatus::Approved
        );
    }

    #[test]
    fn update_status_of_unknown_id_is_a_no_op() {
        let mut store = open();
        store
            .add_request(single_day_draft(&SoldierId::new("1")), "one".to_string())
            .unwrap();
        let before = store.requests().to_vec();
        let blob_before = store.blob().clone();

        let updated = store
            .update_request_status(&RequestId::new("nope"), RequestStatus::Rejected)
            .unwrap();

        assert!(!updated);
        assert_eq!(store.requests(), before.as_slice());
        assert_eq!(store.blob(), &blob_before);
    }

    #[test]
    fn message_can_be_edited_after_creation() {
        let mut store = open();
        let id = store
            .add_request(single_day_draft(&SoldierId::new("1")), "draft".to_string())
            .unwrap()
            .id
            .clone();

        assert!(store
            .update_request_message(&id, "edited".to_string())
            .unwrap());
        assert_eq!(store.request(&id).unwrap().message, "edited");
        assert!(matches!(
            store.update_request_message(&id, String::new()),
            Err(StoreError::Validation(ValidationError::MissingMessage))
        ));
    }

    #[test]
    fn replacement_snapshot_survives_changes_to_replaced_soldier() {
        let mut store = open();
        let sara_id = SoldierId::new("2");
        let sara = store.soldier(&sara_id).unwrap().clone();

        let draft = RequestDraft {
            soldier_id: SoldierId::new("1"),
            commander_name: "אבי מזרחי".to_string(),
            kind: RequestKind::Replacement {
                arrival_date: date(2026, 5, 1),
                departure_date: date(2026, 5, 10),
                base_name: "בסיס צפון".to_string(),
                was_in_base_before: false,
                requires_approval: true,
                replaced_soldier: ReplacedSoldier::snapshot(&sara, date(2026, 5, 2)),
            },
        };
        let message = store.generate_message(&draft).unwrap();
        let request_id = store.add_request(draft, message).unwrap().id.clone();

        // rewrite Sara's stored record behind the store's back
        let mut blob = store.into_blob();
        let mut soldiers: Vec<Soldier> =
            serde_json::from_str(blob.get(SOLDIERS_KEY).unwrap()).unwrap();
        let stored = soldiers.iter_mut().find(|s| s.id == sara_id).unwrap();
        stored.full_name = "שרה לוי-כץ".to_string().try_into().unwrap();
        stored.rank = "רס\"ל".to_string();
        stored.position = "מפקדת צוות".to_string();
        blob.insert(SOLDIERS_KEY, serde_json::to_string(&soldiers).unwrap());

        let store = Store::open(blob).unwrap();
        assert_eq!(
            store.soldier(&sara_id).unwrap().full_name.as_str(),
            "שרה לוי-כץ"
        );

        let request = store.request(&request_id).unwrap();
        let RequestKind::Replacement {
            replaced_soldier, ..
        } = &request.kind
        else {
            panic!("expected a replacement request");
        };
        assert_eq!(replaced_soldier.full_name, "שרה לוי");
        assert_eq!(replaced_soldier.personal_number, "2345678");
        assert_eq!(replaced_soldier.rank, "סמ\"ר");
        assert_eq!(replaced_soldier.position, "קצינת תקשורת");
        assert!(request.message.contains("שרה לוי (מ.א. 2345678)"));
    }

    #[test]
    fn search_scenario_returns_only_matching_soldier() {
        let mut store = open();
        store
            .add_request(single_day_draft(&SoldierId::new("1")), "a".to_string())
            .unwrap();
        store
            .add_request(single_day_draft(&SoldierId::new("2")), "b".to_string())
            .unwrap();

        let filter = RequestFilter {
            search_term: "שרה".to_string(),
            ..RequestFilter::default()
        };
        let views = store.filter_requests(&filter);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].soldier_name(), "שרה לוי");
    }

    #[test]
    fn identity_filter_returns_every_request() {
        let mut store = open();
        for soldier in ["1", "2", "1"] {
            store
                .add_request(single_day_draft(&SoldierId::new(soldier)), "m".to_string())
                .unwrap();
        }
        let filter = RequestFilter {
            search_term: String::new(),
            status: StatusFilter::All,
            ..RequestFilter::default()
        };
        assert_eq!(store.filter_requests(&filter).len(), 3);
        assert_eq!(store.departments(), ["מודיעין", "תקשורת"]);
    }
}
