use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::domain::{MpmApprover, MpmApproverId, MpmApproverUpdate, NewMpmApprover};
use super::repository::{MpmApproverRepository, MpmStore};
use super::service::MpmScorecardService;
use crate::scorecards::common::ScorecardError;
use crate::store::Lifecycle;

impl<S> MpmScorecardService<S>
where
    S: MpmStore,
{
    pub fn create_approver(&self, new_approver: NewMpmApprover) -> Result<MpmApprover, ScorecardError> {
        require_text("name", &new_approver.name)?;
        require_text("position", &new_approver.position)?;
        require_text("department", &new_approver.department)?;
        if let Some(user_id) = new_approver.user_id {
            self.ensure_user_free(user_id, None)?;
        }

        let now = Utc::now();
        let approver = MpmApprover {
            id: MpmApproverId::generate(),
            name: new_approver.name.trim().to_string(),
            position: new_approver.position.trim().to_string(),
            department: new_approver.department.trim().to_string(),
            user_id: new_approver.user_id,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.approvers().insert(approver)?;
        info!(id = %stored.id, name = %stored.name, "mpm approver created");
        Ok(stored)
    }

    pub fn update_approver(
        &self,
        id: MpmApproverId,
        update: MpmApproverUpdate,
    ) -> Result<MpmApprover, ScorecardError> {
        let mut approver = self.approver(id)?;
        for (field, value) in [
            ("name", &update.name),
            ("position", &update.position),
            ("department", &update.department),
        ] {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }
        if let Some(user_id) = update.user_id {
            self.ensure_user_free(user_id, Some(id))?;
        }

        approver.apply(update);
        approver.updated_at = Utc::now();

        let stored = self.store.approvers().update(approver)?;
        info!(%id, name = %stored.name, "mpm approver updated");
        Ok(stored)
    }

    pub fn approver(&self, id: MpmApproverId) -> Result<MpmApprover, ScorecardError> {
        self.store
            .approvers()
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("mpm approver", id))
    }

    pub fn approvers(&self) -> Result<Vec<MpmApprover>, ScorecardError> {
        Ok(self.store.approvers().list()?)
    }

    pub fn approver_by_user(&self, user_id: Uuid) -> Result<MpmApprover, ScorecardError> {
        self.store
            .approvers()
            .by_user(user_id)?
            .ok_or_else(|| ScorecardError::not_found("mpm approver for user", user_id))
    }

    pub fn delete_approver(&self, id: MpmApproverId) -> Result<(), ScorecardError> {
        let mut approver = self.approver(id)?;
        approver.lifecycle = Lifecycle::Deleted;
        approver.updated_at = Utc::now();
        self.store.approvers().update(approver)?;
        info!(%id, "mpm approver deleted");
        Ok(())
    }

    /// One approver per linked user account.
    fn ensure_user_free(
        &self,
        user_id: Uuid,
        current: Option<MpmApproverId>,
    ) -> Result<(), ScorecardError> {
        match self.store.approvers().by_user(user_id)? {
            Some(existing) if Some(existing.id) != current => Err(ScorecardError::Conflict(
                format!("user {user_id} is already an approver"),
            )),
            _ => Ok(()),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ScorecardError> {
    if value.trim().is_empty() {
        return Err(ScorecardError::Validation(format!(
            "approver {field} must not be empty"
        )));
    }
    Ok(())
}
