//! Accessibility notification repository.
//!
//! The store partitions notifications purely by presence of the `resolution`
//! field; the domain sees an explicit [`Resolution`] state instead.

use bson::oid::ObjectId;
use bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::sync::Collection;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::mapper::DocMapper;
use crate::models::{
    AccessibilityNotification, NotificationReport, NotificationResolution, Resolution,
};
use crate::Datasource;

const EXISTS: &str = "$exists";
const SET: &str = "$set";

/// The store operations the repository needs. The driver collection is the
/// production implementation; tests substitute an in-memory one.
pub trait NotificationStore {
    fn find(&self, filter: Option<Document>, options: Option<FindOptions>)
        -> Result<Vec<Document>>;
    fn insert_one(&self, doc: Document) -> Result<()>;
    fn update_one(&self, filter: Document, update: Document) -> Result<()>;
    fn delete_one(&self, filter: Document) -> Result<()>;
}

impl NotificationStore for Collection<Document> {
    fn find(
        &self,
        filter: Option<Document>,
        options: Option<FindOptions>,
    ) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for doc in Collection::find(self, filter, options)? {
            docs.push(doc?);
        }
        Ok(docs)
    }

    fn insert_one(&self, doc: Document) -> Result<()> {
        Collection::insert_one(self, doc, None)?;
        Ok(())
    }

    fn update_one(&self, filter: Document, update: Document) -> Result<()> {
        Collection::update_one(self, filter, update, None)?;
        Ok(())
    }

    fn delete_one(&self, filter: Document) -> Result<()> {
        Collection::delete_one(self, filter, None)?;
        Ok(())
    }
}

pub struct AccessibilityNotificationDao<S = Collection<Document>> {
    store: S,
}

impl AccessibilityNotificationDao {
    pub fn new(datasource: &Datasource) -> Self {
        AccessibilityNotificationDao {
            store: datasource.collection(AccessibilityNotification::COLLECTION_NAME),
        }
    }
}

impl<S: NotificationStore> AccessibilityNotificationDao<S> {
    /// Offset/limit page of still-open notifications.
    pub fn get_unresolved(&self, from: u64, to: i64) -> Result<Vec<AccessibilityNotification>> {
        let options = FindOptions::builder().skip(from).limit(to).build();
        let docs = self
            .store
            .find(Some(resolution_filter(false)), Some(options))?;
        to_notifications(&docs)
    }

    pub fn get_unresolved_by_code(&self, code: &str) -> Result<Vec<AccessibilityNotification>> {
        let docs = self.store.find(Some(by_code_filter(code, false)), None)?;
        to_notifications(&docs)
    }

    pub fn get_resolved_by_code(&self, code: &str) -> Result<Vec<AccessibilityNotification>> {
        let docs = self.store.find(Some(by_code_filter(code, true)), None)?;
        to_notifications(&docs)
    }

    /// Offset/limit page of resolved notifications.
    pub fn get_resolved(&self, from: u64, to: i64) -> Result<Vec<AccessibilityNotification>> {
        let options = FindOptions::builder().skip(from).limit(to).build();
        let docs = self
            .store
            .find(Some(resolution_filter(true)), Some(options))?;
        to_notifications(&docs)
    }

    /// Assigns a fresh identifier, inserts the record unresolved and reads it
    /// back, proving the identifier round-trips through the store.
    pub fn create(&self, report: &NotificationReport) -> Result<AccessibilityNotification> {
        let id = ObjectId::new().to_hex();
        let record = AccessibilityNotification {
            id: id.clone(),
            trail_code: report.trail_code.clone(),
            description: report.description.clone(),
            report_date: report.report_date,
            state: Resolution::Unresolved,
        };
        self.store.insert_one(record.to_doc())?;
        info!(id = %id, trail_code = %report.trail_code, "notification created");
        self.get_by_id(&id)?.ok_or(Error::NotFound)
    }

    /// Sets the resolution fields, then re-reads. Not atomic against a
    /// concurrent delete: a vanished record yields `None`, not an error.
    /// Resolving twice re-sets identical fields and never un-resolves.
    pub fn resolve(
        &self,
        resolution: &NotificationResolution,
    ) -> Result<Option<AccessibilityNotification>> {
        self.store.update_one(
            doc! { AccessibilityNotification::OBJECT_ID: resolution.id.as_str() },
            doc! {
                SET: {
                    AccessibilityNotification::RESOLUTION: resolution.resolution.as_str(),
                    AccessibilityNotification::RESOLUTION_DATE:
                        bson::DateTime::from_chrono(resolution.resolution_date),
                }
            },
        )?;
        let read_back = self.get_by_id(&resolution.id)?;
        if read_back.is_none() {
            warn!(id = %resolution.id, "notification vanished between update and re-read");
        }
        Ok(read_back)
    }

    /// Reads the entity first and deletes second, returning the pre-delete
    /// snapshot. Deleting a missing id yields `None`, never an error.
    pub fn delete(&self, object_id: &str) -> Result<Option<AccessibilityNotification>> {
        let snapshot = self.get_by_id(object_id)?;
        self.store
            .delete_one(doc! { AccessibilityNotification::OBJECT_ID: object_id })?;
        Ok(snapshot)
    }

    /// Same read-then-delete contract, keyed by trail code.
    pub fn delete_by_code(&self, code: &str) -> Result<Option<AccessibilityNotification>> {
        let snapshot = self.get_by_code(code)?;
        self.store
            .delete_one(doc! { AccessibilityNotification::TRAIL_CODE: code })?;
        Ok(snapshot)
    }

    fn get_by_id(&self, object_id: &str) -> Result<Option<AccessibilityNotification>> {
        let filter = doc! { AccessibilityNotification::OBJECT_ID: object_id };
        let docs = self.store.find(Some(filter), None)?;
        Ok(to_notifications(&docs)?.into_iter().next())
    }

    fn get_by_code(&self, code: &str) -> Result<Option<AccessibilityNotification>> {
        let filter = doc! { AccessibilityNotification::TRAIL_CODE: code };
        let docs = self.store.find(Some(filter), None)?;
        Ok(to_notifications(&docs)?.into_iter().next())
    }
}

fn to_notifications(docs: &[Document]) -> Result<Vec<AccessibilityNotification>> {
    let mut notifications = Vec::new();
    for doc in docs {
        notifications.push(AccessibilityNotification::from_doc(doc)?);
    }
    Ok(notifications)
}

fn resolution_filter(resolved: bool) -> Document {
    doc! { AccessibilityNotification::RESOLUTION: { EXISTS: resolved } }
}

fn by_code_filter(code: &str, resolved: bool) -> Document {
    doc! {
        AccessibilityNotification::TRAIL_CODE: code,
        AccessibilityNotification::RESOLUTION: { EXISTS: resolved },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryStore {
        docs: RefCell<Vec<Document>>,
    }

    fn matches(doc: &Document, filter: &Document) -> bool {
        filter.iter().all(|(field, expected)| match expected {
            Bson::Document(cond) if cond.contains_key(EXISTS) => {
                doc.contains_key(field) == cond.get_bool(EXISTS).unwrap_or(false)
            }
            other => doc.get(field) == Some(other),
        })
    }

    impl NotificationStore for MemoryStore {
        fn find(
            &self,
            filter: Option<Document>,
            options: Option<FindOptions>,
        ) -> Result<Vec<Document>> {
            let filter = filter.unwrap_or_default();
            let mut hits: Vec<Document> = self
                .docs
                .borrow()
                .iter()
                .filter(|doc| matches(doc, &filter))
                .cloned()
                .collect();
            if let Some(options) = options {
                let skip = options.skip.unwrap_or(0) as usize;
                hits = hits.into_iter().skip(skip).collect();
                if let Some(limit) = options.limit {
                    hits.truncate(limit as usize);
                }
            }
            Ok(hits)
        }

        fn insert_one(&self, doc: Document) -> Result<()> {
            self.docs.borrow_mut().push(doc);
            Ok(())
        }

        fn update_one(&self, filter: Document, update: Document) -> Result<()> {
            let mut docs = self.docs.borrow_mut();
            if let Some(doc) = docs.iter_mut().find(|doc| matches(doc, &filter)) {
                if let Ok(set) = update.get_document(SET) {
                    for (field, value) in set {
                        doc.insert(field, value.clone());
                    }
                }
            }
            Ok(())
        }

        fn delete_one(&self, filter: Document) -> Result<()> {
            let mut docs = self.docs.borrow_mut();
            if let Some(at) = docs.iter().position(|doc| matches(doc, &filter)) {
                docs.remove(at);
            }
            Ok(())
        }
    }

    fn dao() -> AccessibilityNotificationDao<MemoryStore> {
        AccessibilityNotificationDao {
            store: MemoryStore::default(),
        }
    }

    fn report(code: &str) -> NotificationReport {
        NotificationReport {
            trail_code: code.to_string(),
            description: "fallen tree".to_string(),
            report_date: Utc.timestamp_millis_opt(1_610_000_000_000).unwrap(),
        }
    }

    fn resolution_for(id: &str) -> NotificationResolution {
        NotificationResolution {
            id: id.to_string(),
            resolution: "cleared by section crew".to_string(),
            resolution_date: Utc.timestamp_millis_opt(1_611_000_000_000).unwrap(),
        }
    }

    #[test]
    fn partitioning_is_by_field_presence_only() {
        let unresolved = resolution_filter(false);
        let sentinel = unresolved
            .get_document(AccessibilityNotification::RESOLUTION)
            .unwrap();
        assert!(!sentinel.get_bool(EXISTS).unwrap());
        assert_eq!(unresolved.len(), 1);

        let resolved = resolution_filter(true);
        let sentinel = resolved
            .get_document(AccessibilityNotification::RESOLUTION)
            .unwrap();
        assert!(sentinel.get_bool(EXISTS).unwrap());
    }

    #[test]
    fn code_filters_combine_code_and_state() {
        let filter = by_code_filter("VD01", true);
        assert_eq!(
            filter.get_str(AccessibilityNotification::TRAIL_CODE).unwrap(),
            "VD01"
        );
        assert!(filter
            .get_document(AccessibilityNotification::RESOLUTION)
            .unwrap()
            .get_bool(EXISTS)
            .unwrap());
    }

    #[test]
    fn created_notifications_start_unresolved() {
        let dao = dao();
        let created = dao.create(&report("VD01")).unwrap();
        assert_eq!(created.state, Resolution::Unresolved);
        assert_eq!(dao.get_unresolved(0, 10).unwrap(), vec![created]);
        assert!(dao.get_resolved(0, 10).unwrap().is_empty());
    }

    #[test]
    fn delete_of_a_missing_id_yields_none() {
        assert_eq!(dao().delete("missing").unwrap(), None);
    }

    #[test]
    fn second_delete_of_the_same_id_yields_none() {
        let dao = dao();
        let created = dao.create(&report("VD01")).unwrap();
        assert_eq!(dao.delete(&created.id).unwrap().as_ref(), Some(&created));
        assert_eq!(dao.delete(&created.id).unwrap(), None);
    }

    #[test]
    fn delete_by_code_drains_one_notification_per_call() {
        let dao = dao();
        dao.create(&report("VD01")).unwrap();
        dao.create(&report("VD01")).unwrap();
        assert!(dao.delete_by_code("VD01").unwrap().is_some());
        assert!(dao.delete_by_code("VD01").unwrap().is_some());
        assert_eq!(dao.delete_by_code("VD01").unwrap(), None);
    }

    #[test]
    fn resolve_of_a_vanished_id_yields_none() {
        assert_eq!(dao().resolve(&resolution_for("gone")).unwrap(), None);
    }

    #[test]
    fn resolving_twice_never_unresolves() {
        let dao = dao();
        let created = dao.create(&report("VD01")).unwrap();
        let resolution = resolution_for(&created.id);
        let first = dao.resolve(&resolution).unwrap().unwrap();
        assert!(first.state.is_resolved());
        let second = dao.resolve(&resolution).unwrap().unwrap();
        assert_eq!(second, first);
        assert_eq!(dao.get_resolved_by_code("VD01").unwrap(), vec![second]);
        assert!(dao.get_unresolved_by_code("VD01").unwrap().is_empty());
    }
}
