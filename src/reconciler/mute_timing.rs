//! Mute timing lifecycle. Mute timings have no UID; the name is the key.

use super::{observed, timed, Reconciler};
use crate::error::ProvisionError;
use crate::ids::{OrgResourceId, ResourceId};
use crate::models::MuteTiming;
use crate::mute_timing::{intervals_equivalent, pack_mute_timing, unpack_mute_timing, validate};
use crate::state::{MuteTimingConfig, ReadOutcome};
use tracing::{info, info_span, warn, Instrument};

const RESOURCE: &str = "mute timing";
const METRIC_RESOURCE: &str = "mute_timing";

impl Reconciler {
    /// # Errors
    /// Returns an error if validation or the create call fails
    pub async fn create_mute_timing(
        &self,
        desired: &MuteTimingConfig,
    ) -> Result<MuteTimingConfig, ProvisionError> {
        let org_id = self.org_id(desired.org_id);
        let span = info_span!(
            "mute_timing.create",
            org.id = org_id,
            mute_timing.name = %desired.name
        );

        timed(
            METRIC_RESOURCE,
            "create",
            self.locked(org_id, self.create_mute_timing_unlocked(org_id, desired)),
        )
        .instrument(span)
        .await
    }

    /// Replace the intervals of a mute timing; a changed name replaces the
    /// mute timing. Equivalent intervals are left alone.
    ///
    /// # Errors
    /// Returns an error if validation or any API call fails
    pub async fn update_mute_timing(
        &self,
        desired: &MuteTimingConfig,
        prior: &MuteTimingConfig,
    ) -> Result<MuteTimingConfig, ProvisionError> {
        let org_id = self.org_id(desired.org_id.or(prior.org_id));
        let span = info_span!(
            "mute_timing.update",
            org.id = org_id,
            mute_timing.name = %desired.name
        );

        let operation = async {
            validate(desired)?;

            if !prior.name.is_empty() && prior.name != desired.name {
                info!(
                    "Mute timing renamed from {} to {}, replacing it",
                    prior.name, desired.name
                );
                self.delete_mute_timing_by_name(org_id, &prior.name).await?;
                return self.create_mute_timing_unlocked(org_id, desired).await;
            }

            let current = self.get_mute_timing(org_id, &desired.name).await?;
            let unchanged = current.as_ref().is_some_and(|current| {
                intervals_equivalent(&pack_mute_timing(current, None).intervals, &desired.intervals)
            });

            if unchanged {
                info!("Mute timing {} is up to date", desired.name);
            } else {
                observed(
                    "mute_timings.update",
                    self.api.update_mute_timing(
                        org_id,
                        &desired.name,
                        &unpack_mute_timing(desired),
                    ),
                )
                .await
                .map_err(|source| ProvisionError::Api {
                    operation: "update",
                    resource: RESOURCE,
                    name: desired.name.clone(),
                    source,
                })?;
                info!("Updated mute timing {}", desired.name);
            }

            self.read_mute_timing_after_apply(org_id, desired).await
        };

        timed(METRIC_RESOURCE, "update", self.locked(org_id, operation))
            .instrument(span)
            .await
    }

    /// Read a mute timing by `org:name` identifier, keeping the month
    /// spelling of `prior` where it is equivalent
    ///
    /// # Errors
    /// Returns an error on API failures other than not-found
    pub async fn read_mute_timing(
        &self,
        id: &str,
        prior: Option<&MuteTimingConfig>,
    ) -> Result<ReadOutcome<MuteTimingConfig>, ProvisionError> {
        let id = ResourceId::parse(id, self.settings.default_org_id)?;
        let org_id = id.org_id();
        let span = info_span!(
            "mute_timing.read",
            org.id = org_id,
            mute_timing.name = %id.name()
        );

        let operation = async {
            match self.get_mute_timing(org_id, id.name()).await? {
                Some(timing) => Ok::<_, ProvisionError>(ReadOutcome::Found(packed(
                    org_id, &timing, prior,
                ))),
                None => {
                    warn!(
                        "Mute timing {} not found in org {}, dropping it from tracked state",
                        id.name(),
                        org_id
                    );
                    Ok(ReadOutcome::Missing)
                }
            }
        };

        timed(METRIC_RESOURCE, "read", self.locked(org_id, operation))
            .instrument(span)
            .await
    }

    /// A missing mute timing is not an error
    ///
    /// # Errors
    /// Returns an error if the delete call fails for another reason
    pub async fn delete_mute_timing(&self, id: &str) -> Result<(), ProvisionError> {
        let id = ResourceId::parse(id, self.settings.default_org_id)?;
        let org_id = id.org_id();
        let span = info_span!(
            "mute_timing.delete",
            org.id = org_id,
            mute_timing.name = %id.name()
        );

        timed(
            METRIC_RESOURCE,
            "delete",
            self.locked(org_id, self.delete_mute_timing_by_name(org_id, id.name())),
        )
        .instrument(span)
        .await
    }

    async fn create_mute_timing_unlocked(
        &self,
        org_id: i64,
        desired: &MuteTimingConfig,
    ) -> Result<MuteTimingConfig, ProvisionError> {
        validate(desired)?;

        let created = observed(
            "mute_timings.create",
            self.api
                .create_mute_timing(org_id, &unpack_mute_timing(desired)),
        )
        .await
        .map_err(|source| ProvisionError::Api {
            operation: "create",
            resource: RESOURCE,
            name: desired.name.clone(),
            source,
        })?;
        info!("Created mute timing {}", created.name);

        self.read_mute_timing_after_apply(org_id, desired).await
    }

    async fn read_mute_timing_after_apply(
        &self,
        org_id: i64,
        desired: &MuteTimingConfig,
    ) -> Result<MuteTimingConfig, ProvisionError> {
        match self.get_mute_timing(org_id, &desired.name).await? {
            Some(timing) => Ok(packed(org_id, &timing, Some(desired))),
            None => Err(ProvisionError::MissingAfterApply {
                resource: RESOURCE,
                name: desired.name.clone(),
            }),
        }
    }

    async fn delete_mute_timing_by_name(
        &self,
        org_id: i64,
        name: &str,
    ) -> Result<(), ProvisionError> {
        match observed(
            "mute_timings.delete",
            self.api.delete_mute_timing(org_id, name),
        )
        .await
        {
            Ok(()) => {
                info!("Deleted mute timing {}", name);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                warn!(
                    "Mute timing {} not found in org {}, nothing to delete",
                    name, org_id
                );
                Ok(())
            }
            Err(source) => Err(ProvisionError::Api {
                operation: "delete",
                resource: RESOURCE,
                name: name.to_string(),
                source,
            }),
        }
    }

    /// `None` when the backend reports the mute timing as not found
    async fn get_mute_timing(
        &self,
        org_id: i64,
        name: &str,
    ) -> Result<Option<MuteTiming>, ProvisionError> {
        match observed("mute_timings.get", self.api.get_mute_timing(org_id, name)).await {
            Ok(timing) => Ok(Some(timing)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(source) => Err(ProvisionError::Api {
                operation: "read",
                resource: RESOURCE,
                name: name.to_string(),
                source,
            }),
        }
    }
}

fn packed(org_id: i64, timing: &MuteTiming, prior: Option<&MuteTimingConfig>) -> MuteTimingConfig {
    let mut config = pack_mute_timing(timing, prior);
    config.org_id = Some(org_id);
    config.id = Some(OrgResourceId::new(org_id, timing.name.clone()).to_string());
    config
}
