//! Contact point lifecycle: create, update, read, import and delete.

use super::{log_phase, observed, timed, ReconcilePhase, Reconciler};
use crate::error::ProvisionError;
use crate::ids::{OrgResourceId, ResourceId};
use crate::models::ContactPoint;
use crate::notifier::DesiredNotifier;
use crate::reconciler::retry::{retry_within_budget, RetryError};
use crate::state::{ContactPointConfig, NotifierInstance, ReadOutcome};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, info_span, warn, Instrument};

const RESOURCE: &str = "contact point";
const METRIC_RESOURCE: &str = "contact_point";

impl Reconciler {
    /// Create every declared notifier and return the resulting state
    ///
    /// # Errors
    /// Returns an error if validation or any API call fails
    pub async fn create_contact_point(
        &self,
        desired: &ContactPointConfig,
    ) -> Result<ContactPointConfig, ProvisionError> {
        let org_id = self.org_id(desired.org_id);
        let span = info_span!(
            "contact_point.create",
            org.id = org_id,
            contact_point.name = %desired.name
        );

        timed(
            METRIC_RESOURCE,
            "create",
            self.locked(org_id, self.reconcile_contact_point(org_id, desired, false)),
        )
        .instrument(span)
        .await
    }

    /// Bring the remote contact point in line with `desired`.
    ///
    /// `prior` is the state returned by the previous reconciliation. Declared
    /// notifiers without a UID take the UID of an identical prior notifier, so
    /// unchanged notifiers are updated in place. A changed name replaces the
    /// whole contact point.
    ///
    /// # Errors
    /// Returns the first failure; changes applied before it are kept
    pub async fn update_contact_point(
        &self,
        desired: &ContactPointConfig,
        prior: &ContactPointConfig,
    ) -> Result<ContactPointConfig, ProvisionError> {
        let org_id = self.org_id(desired.org_id.or(prior.org_id));
        let span = info_span!(
            "contact_point.update",
            org.id = org_id,
            contact_point.name = %desired.name
        );

        let operation = async {
            if !prior.name.is_empty() && prior.name != desired.name {
                info!(
                    "Contact point renamed from {} to {}, replacing it",
                    prior.name, desired.name
                );
                self.delete_by_name(org_id, &prior.name).await?;
                let fresh = without_uids(desired);
                return self.reconcile_contact_point(org_id, &fresh, false).await;
            }
            let desired = with_prior_uids(desired, prior);
            self.reconcile_contact_point(org_id, &desired, true).await
        };

        timed(METRIC_RESOURCE, "update", self.locked(org_id, operation))
            .instrument(span)
            .await
    }

    /// Read a contact point by `org:name` identifier.
    ///
    /// Secure fields are taken from `prior`. Identifiers without an org
    /// prefix may also be a `;`-joined list of notifier UIDs.
    ///
    /// # Errors
    /// Returns an error on API failures or an inconsistent legacy identifier
    pub async fn read_contact_point(
        &self,
        id: &str,
        prior: &ContactPointConfig,
    ) -> Result<ReadOutcome<ContactPointConfig>, ProvisionError> {
        let id = ResourceId::parse(id, self.settings.default_org_id)?;
        let org_id = id.org_id();
        let span = info_span!(
            "contact_point.read",
            org.id = org_id,
            contact_point.name = %id.name()
        );

        timed(
            METRIC_RESOURCE,
            "read",
            self.locked(org_id, self.read_contact_point_unlocked(&id, prior)),
        )
        .instrument(span)
        .await
    }

    /// Adopt an existing contact point without prior state
    ///
    /// # Errors
    /// Returns [`ProvisionError::NotFound`] when nothing matches `id`
    pub async fn import_contact_point(&self, id: &str) -> Result<ContactPointConfig, ProvisionError> {
        match self
            .read_contact_point(id, &ContactPointConfig::default())
            .await?
        {
            ReadOutcome::Found(config) => Ok(config),
            ReadOutcome::Missing => Err(ProvisionError::NotFound {
                resource: RESOURCE,
                id: id.to_string(),
            }),
        }
    }

    /// Delete every notifier of a contact point; a missing contact point is not an error
    ///
    /// # Errors
    /// Returns an error naming the notifier UID that could not be removed
    pub async fn delete_contact_point(&self, id: &str) -> Result<(), ProvisionError> {
        let id = ResourceId::parse(id, self.settings.default_org_id)?;
        let org_id = id.org_id();
        let span = info_span!(
            "contact_point.delete",
            org.id = org_id,
            contact_point.name = %id.name()
        );

        timed(
            METRIC_RESOURCE,
            "delete",
            self.locked(org_id, self.delete_by_name(org_id, id.name())),
        )
        .instrument(span)
        .await
    }

    async fn reconcile_contact_point(
        &self,
        org_id: i64,
        desired: &ContactPointConfig,
        fetch_current: bool,
    ) -> Result<ContactPointConfig, ProvisionError> {
        let name = desired.name.as_str();
        let result: Result<ContactPointConfig, ProvisionError> = async {
            log_phase(name, ReconcilePhase::Unpacking);
            let mut notifiers = self.registry.unpack_contact_point(desired)?;

            let current = if fetch_current {
                log_phase(name, ReconcilePhase::FetchingCurrent);
                self.list_by_name(org_id, name).await?
            } else {
                Vec::new()
            };

            log_phase(name, ReconcilePhase::Applying);
            self.apply_notifiers(org_id, name, &mut notifiers, &current)
                .await?;
            let applied = applied_config(desired, &notifiers);

            log_phase(name, ReconcilePhase::Reading);
            let id = ResourceId::Org(OrgResourceId::new(org_id, name));
            match self.read_contact_point_unlocked(&id, &applied).await? {
                ReadOutcome::Found(config) => Ok(config),
                ReadOutcome::Missing => Err(ProvisionError::MissingAfterApply {
                    resource: RESOURCE,
                    name: name.to_string(),
                }),
            }
        }
        .await;

        match &result {
            Ok(_) => log_phase(name, ReconcilePhase::Done),
            Err(err) => warn!(
                "Contact point {}: {}: {}",
                name,
                ReconcilePhase::Failed.as_str(),
                err
            ),
        }
        result
    }

    /// Update notifiers that carry a UID, create the others, then delete
    /// every current record that was neither
    async fn apply_notifiers(
        &self,
        org_id: i64,
        name: &str,
        notifiers: &mut [DesiredNotifier<'_>],
        current: &[ContactPoint],
    ) -> Result<(), ProvisionError> {
        let mut processed: HashSet<String> = HashSet::with_capacity(notifiers.len());

        for desired in notifiers.iter_mut() {
            let uid = if let Some(uid) = desired.uid().map(str::to_string) {
                observed(
                    "contact_points.update",
                    self.api
                        .update_contact_point(org_id, &uid, &desired.backend),
                )
                .await
                .map_err(|source| ProvisionError::UpdateNotifier {
                    uid: uid.clone(),
                    name: name.to_string(),
                    source,
                })?;
                info!(
                    "Updated {} notifier {} in contact point {}",
                    desired.backend.type_tag, uid, name
                );
                uid
            } else {
                let created = self.create_notifier(org_id, name, &desired.backend).await?;
                info!(
                    "Created {} notifier {} in contact point {}",
                    desired.backend.type_tag, created.uid, name
                );
                created.uid
            };

            desired.state.uid.clone_from(&uid);
            desired.backend.uid.clone_from(&uid);
            processed.insert(uid);
        }

        for stale in current
            .iter()
            .filter(|record| !processed.contains(&record.uid))
        {
            observed(
                "contact_points.delete",
                self.api.delete_contact_point(org_id, &stale.uid),
            )
            .await
            .map_err(|source| ProvisionError::RemoveNotifier {
                uid: stale.uid.clone(),
                name: stale.name.clone(),
                source,
            })?;
            info!(
                "Removed {} notifier {} from contact point {}",
                stale.type_tag, stale.uid, stale.name
            );
        }

        Ok(())
    }

    async fn create_notifier(
        &self,
        org_id: i64,
        name: &str,
        backend: &ContactPoint,
    ) -> Result<ContactPoint, ProvisionError> {
        let api = &self.api;
        let what = format!(
            "Creating {} notifier in contact point {}",
            backend.type_tag, name
        );

        let result = retry_within_budget(
            self.settings.retry_policy(),
            &self.cancel,
            &what,
            |err| Self::is_transient_create_error(org_id, err),
            move || {
                observed(
                    "contact_points.create",
                    api.create_contact_point(org_id, backend),
                )
            },
        )
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(RetryError::Fatal(source)) => Err(ProvisionError::Api {
                operation: "create",
                resource: RESOURCE,
                name: name.to_string(),
                source,
            }),
            Err(RetryError::Exhausted {
                attempts,
                elapsed,
                last,
            }) => Err(ProvisionError::RetryExhausted {
                notifier: backend.type_tag.clone(),
                name: name.to_string(),
                attempts,
                elapsed,
                source: last,
            }),
            Err(RetryError::Cancelled) => Err(ProvisionError::Cancelled {
                name: name.to_string(),
            }),
        }
    }

    async fn read_contact_point_unlocked(
        &self,
        id: &ResourceId,
        prior: &ContactPointConfig,
    ) -> Result<ReadOutcome<ContactPointConfig>, ProvisionError> {
        let org_id = id.org_id();
        let mut points = self.list_by_name(org_id, id.name()).await?;

        if points.is_empty() {
            if let Some(uids) = id.legacy_uids() {
                points = self.find_by_legacy_uids(org_id, &uids).await?;
            }
        }

        if points.is_empty() {
            warn!(
                "Contact point {} not found in org {}, dropping it from tracked state",
                id.name(),
                org_id
            );
            return Ok(ReadOutcome::Missing);
        }

        let mut config = self.registry.pack_contact_points(&points, prior);
        config.org_id = Some(org_id);
        config.id = Some(OrgResourceId::new(org_id, config.name.clone()).to_string());
        Ok(ReadOutcome::Found(config))
    }

    /// Resolve the deprecated `uid1;uid2` identifier; every UID must exist
    /// and all of them must belong to one contact point
    async fn find_by_legacy_uids(
        &self,
        org_id: i64,
        uids: &[&str],
    ) -> Result<Vec<ContactPoint>, ProvisionError> {
        let wanted: HashSet<&str> = uids.iter().copied().collect();
        let all = self.list(org_id, None).await?;

        let mut matched: Vec<ContactPoint> = Vec::new();
        for point in all {
            if !wanted.contains(point.uid.as_str()) {
                continue;
            }
            if let Some(first) = matched.first() {
                if first.name != point.name {
                    return Err(ProvisionError::InconsistentImport {
                        uid: point.uid,
                        name: point.name,
                        first_uid: first.uid.clone(),
                        first_name: first.name.clone(),
                    });
                }
            }
            matched.push(point);
        }

        if let Some(missing) = uids
            .iter()
            .find(|uid| !matched.iter().any(|point| point.uid == **uid))
        {
            return Err(ProvisionError::ImportUidNotFound {
                uid: (*missing).to_string(),
            });
        }

        Ok(matched)
    }

    async fn delete_by_name(&self, org_id: i64, name: &str) -> Result<(), ProvisionError> {
        let points = self.list_by_name(org_id, name).await?;
        if points.is_empty() {
            warn!(
                "Contact point {} not found in org {}, nothing to delete",
                name, org_id
            );
            return Ok(());
        }

        for point in &points {
            observed(
                "contact_points.delete",
                self.api.delete_contact_point(org_id, &point.uid),
            )
            .await
            .map_err(|source| ProvisionError::RemoveNotifier {
                uid: point.uid.clone(),
                name: point.name.clone(),
                source,
            })?;
        }
        info!(
            "Deleted contact point {} ({} notifiers)",
            name,
            points.len()
        );
        Ok(())
    }

    async fn list_by_name(
        &self,
        org_id: i64,
        name: &str,
    ) -> Result<Vec<ContactPoint>, ProvisionError> {
        self.list(org_id, Some(name)).await
    }

    /// List records; a not-found answer is an empty list
    async fn list(
        &self,
        org_id: i64,
        name: Option<&str>,
    ) -> Result<Vec<ContactPoint>, ProvisionError> {
        match observed(
            "contact_points.list",
            self.api.list_contact_points(org_id, name),
        )
        .await
        {
            Ok(points) => Ok(points),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(source) => Err(ProvisionError::Api {
                operation: "list",
                resource: RESOURCE,
                name: name.unwrap_or("*").to_string(),
                source,
            }),
        }
    }
}

/// The declared contact point with the UIDs assigned during apply
fn applied_config(
    desired: &ContactPointConfig,
    notifiers: &[DesiredNotifier<'_>],
) -> ContactPointConfig {
    let mut groups: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for notifier in notifiers {
        groups
            .entry(notifier.notifier.meta().field.to_string())
            .or_default()
            .push(notifier.state.clone());
    }

    ContactPointConfig {
        id: desired.id.clone(),
        org_id: desired.org_id,
        name: desired.name.clone(),
        notifiers: groups,
    }
}

/// Give each UID-less declared notifier the UID of an unclaimed prior
/// notifier of the same kind with identical declared values
fn with_prior_uids(desired: &ContactPointConfig, prior: &ContactPointConfig) -> ContactPointConfig {
    let mut claimed: HashSet<&str> = desired.uids().into_iter().collect();
    let mut matched = desired.clone();

    for (group, instances) in &mut matched.notifiers {
        let Some(candidates) = prior.notifiers.get(group) else {
            continue;
        };
        for instance in instances.iter_mut().filter(|instance| instance.uid.is_empty()) {
            let found = candidates.iter().find(|candidate| {
                !candidate.uid.is_empty()
                    && !claimed.contains(candidate.uid.as_str())
                    && same_declaration(candidate, instance)
            });
            if let Some(candidate) = found {
                claimed.insert(candidate.uid.as_str());
                instance.uid.clone_from(&candidate.uid);
            }
        }
    }
    matched
}

fn same_declaration(a: &NotifierInstance, b: &NotifierInstance) -> bool {
    a.disable_resolve_message == b.disable_resolve_message
        && a.settings == b.settings
        && a.fields == b.fields
}

fn without_uids(config: &ContactPointConfig) -> ContactPointConfig {
    let mut fresh = config.clone();
    for instance in fresh.notifiers.values_mut().flatten() {
        instance.uid.clear();
    }
    fresh
}
