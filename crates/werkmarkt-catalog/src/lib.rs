//! Werkmarkt Catalog - posting rules
//!
//! Creation, opening, updating and closing of client work requests. The
//! acceptance transition (posting -> assigned) belongs to
//! `werkmarkt-proposals`; everything else that mutates a posting goes
//! through here.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use werkmarkt_types::{
    ActorContext, BudgetType, Currency, Posting, PostingId, PostingStatus,
};

/// Bounds carried over from the platform's submission forms.
const TITLE_MIN: usize = 10;
const TITLE_MAX: usize = 200;
const DESCRIPTION_MIN: usize = 50;
const DESCRIPTION_MAX: usize = 5000;

/// Catalog rule violations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed or missing input; the caller must fix and resubmit
    #[error("Validation error: {0}")]
    Validation(String),

    /// The posting is not in a state that admits this operation
    #[error("Illegal posting transition from {from:?}")]
    IllegalTransition { from: PostingStatus },

    /// Only the owning client may mutate a posting
    #[error("Not the posting owner")]
    NotOwner,
}

/// Fields a client submits when creating a posting
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub tools_required: Vec<String>,
    pub budget_type: BudgetType,
    #[serde(default)]
    pub budget_min: Option<i64>,
    #[serde(default)]
    pub budget_max: Option<i64>,
    pub currency: Currency,
    #[serde(default)]
    pub deadline: Option<chrono::DateTime<Utc>>,
    #[serde(default)]
    pub estimated_duration: Option<String>,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Publish immediately instead of saving as draft
    #[serde(default)]
    pub publish: bool,
}

/// Owner-editable fields, legal while the posting is draft or open
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub deadline: Option<chrono::DateTime<Utc>>,
    #[serde(default)]
    pub is_urgent: Option<bool>,
    #[serde(default)]
    pub skills_required: Option<Vec<String>>,
    #[serde(default)]
    pub tools_required: Option<Vec<String>>,
}

/// Create a posting owned by the acting client.
///
/// Fails with `Validation` when title, description or budget are missing
/// or out of bounds.
pub fn create_posting(owner: &ActorContext, draft: PostingDraft) -> Result<Posting, CatalogError> {
    validate_draft(&draft)?;

    let now = Utc::now();
    let posting = Posting {
        id: PostingId::generate(),
        client_id: owner.user_id,
        title: draft.title,
        description: draft.description,
        requirements: draft.requirements,
        category_id: draft.category_id,
        skills_required: draft.skills_required,
        tools_required: draft.tools_required,
        budget_type: draft.budget_type,
        budget_min: draft.budget_min,
        budget_max: draft.budget_max,
        currency: draft.currency,
        deadline: draft.deadline,
        estimated_duration: draft.estimated_duration,
        status: if draft.publish {
            PostingStatus::Open
        } else {
            PostingStatus::Draft
        },
        is_urgent: draft.is_urgent,
        is_featured: false,
        attachments: draft.attachments,
        view_count: 0,
        assigned_expert_id: None,
        assigned_at: None,
        completed_at: None,
        cancelled_at: None,
        cancellation_reason: None,
        created_at: now,
        updated_at: now,
    };

    tracing::debug!(posting_id = %posting.id, status = ?posting.status, "created posting");
    Ok(posting)
}

/// Publish a draft posting. A no-op when the posting is already open.
pub fn open_posting(posting: &mut Posting, actor: &ActorContext) -> Result<(), CatalogError> {
    require_owner(posting, actor)?;
    match posting.status {
        PostingStatus::Open => Ok(()),
        PostingStatus::Draft => {
            posting.status = PostingStatus::Open;
            posting.updated_at = Utc::now();
            Ok(())
        }
        from => Err(CatalogError::IllegalTransition { from }),
    }
}

/// Apply owner edits. Legal only while the posting is draft or open.
pub fn update_posting(
    posting: &mut Posting,
    actor: &ActorContext,
    update: PostingUpdate,
) -> Result<(), CatalogError> {
    require_owner(posting, actor)?;
    if !matches!(posting.status, PostingStatus::Draft | PostingStatus::Open) {
        return Err(CatalogError::IllegalTransition {
            from: posting.status,
        });
    }

    if let Some(title) = update.title {
        validate_len("title", &title, TITLE_MIN, TITLE_MAX)?;
        posting.title = title;
    }
    if let Some(description) = update.description {
        validate_len("description", &description, DESCRIPTION_MIN, DESCRIPTION_MAX)?;
        posting.description = description;
    }
    if let Some(requirements) = update.requirements {
        posting.requirements = Some(requirements);
    }
    if let Some(deadline) = update.deadline {
        posting.deadline = Some(deadline);
    }
    if let Some(is_urgent) = update.is_urgent {
        posting.is_urgent = is_urgent;
    }
    if let Some(skills) = update.skills_required {
        posting.skills_required = skills;
    }
    if let Some(tools) = update.tools_required {
        posting.tools_required = tools;
    }
    posting.updated_at = Utc::now();
    Ok(())
}

/// Close a posting without a hire. Legal from any non-terminal status.
///
/// Clears any assignment so the expert/status invariant keeps holding.
pub fn close_posting(
    posting: &mut Posting,
    actor: &ActorContext,
    reason: Option<String>,
) -> Result<(), CatalogError> {
    require_owner(posting, actor)?;
    if posting.status.is_terminal() {
        return Err(CatalogError::IllegalTransition {
            from: posting.status,
        });
    }

    posting.status = PostingStatus::Cancelled;
    posting.assigned_expert_id = None;
    posting.assigned_at = None;
    posting.cancelled_at = Some(Utc::now());
    posting.cancellation_reason = reason;
    posting.updated_at = Utc::now();

    tracing::info!(posting_id = %posting.id, "closed posting");
    Ok(())
}

fn require_owner(posting: &Posting, actor: &ActorContext) -> Result<(), CatalogError> {
    if actor.is_system() || actor.is(&posting.client_id) {
        Ok(())
    } else {
        Err(CatalogError::NotOwner)
    }
}

fn validate_draft(draft: &PostingDraft) -> Result<(), CatalogError> {
    validate_len("title", &draft.title, TITLE_MIN, TITLE_MAX)?;
    validate_len("description", &draft.description, DESCRIPTION_MIN, DESCRIPTION_MAX)?;

    match draft.budget_type {
        BudgetType::Fixed | BudgetType::Hourly => {
            let amount = draft
                .budget_min
                .or(draft.budget_max)
                .ok_or_else(|| CatalogError::Validation("budget is required".into()))?;
            if amount <= 0 {
                return Err(CatalogError::Validation("budget must be positive".into()));
            }
        }
        BudgetType::Range => {
            let (min, max) = match (draft.budget_min, draft.budget_max) {
                (Some(min), Some(max)) => (min, max),
                _ => {
                    return Err(CatalogError::Validation(
                        "range budgets need both a minimum and a maximum".into(),
                    ))
                }
            };
            if min <= 0 || max < min {
                return Err(CatalogError::Validation(
                    "budget range must be positive and ordered".into(),
                ));
            }
        }
    }
    Ok(())
}

fn validate_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), CatalogError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(CatalogError::Validation(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use werkmarkt_types::{ActorRole, UserId};

    fn client() -> ActorContext {
        ActorContext::new(UserId::generate(), ActorRole::Client)
    }

    fn draft() -> PostingDraft {
        PostingDraft {
            title: "CAD review for a machined bracket".into(),
            description: "Need a thorough manufacturability review of a CAD model, \
                          with written feedback on tolerances and material choice."
                .into(),
            requirements: None,
            category_id: None,
            skills_required: vec!["cad".into()],
            tools_required: vec![],
            budget_type: BudgetType::Range,
            budget_min: Some(200_000),
            budget_max: Some(400_000),
            currency: Currency::Chf,
            deadline: None,
            estimated_duration: None,
            is_urgent: false,
            attachments: vec![],
            publish: true,
        }
    }

    #[test]
    fn creates_open_posting() {
        let owner = client();
        let posting = create_posting(&owner, draft()).unwrap();
        assert_eq!(posting.status, PostingStatus::Open);
        assert_eq!(posting.client_id, owner.user_id);
        assert!(posting.assignment_consistent());
    }

    #[test]
    fn rejects_short_title() {
        let mut d = draft();
        d.title = "too short".into();
        assert!(matches!(
            create_posting(&client(), d),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn rejects_inverted_budget_range() {
        let mut d = draft();
        d.budget_min = Some(400_000);
        d.budget_max = Some(200_000);
        assert!(matches!(
            create_posting(&client(), d),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn rejects_missing_budget() {
        let mut d = draft();
        d.budget_type = BudgetType::Fixed;
        d.budget_min = None;
        d.budget_max = None;
        assert!(matches!(
            create_posting(&client(), d),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn open_is_idempotent() {
        let owner = client();
        let mut d = draft();
        d.publish = false;
        let mut posting = create_posting(&owner, d).unwrap();
        assert_eq!(posting.status, PostingStatus::Draft);

        open_posting(&mut posting, &owner).unwrap();
        assert_eq!(posting.status, PostingStatus::Open);
        open_posting(&mut posting, &owner).unwrap();
        assert_eq!(posting.status, PostingStatus::Open);
    }

    #[test]
    fn only_owner_mutates() {
        let owner = client();
        let stranger = client();
        let mut posting = create_posting(&owner, draft()).unwrap();
        assert!(matches!(
            close_posting(&mut posting, &stranger, None),
            Err(CatalogError::NotOwner)
        ));
    }

    #[test]
    fn close_clears_assignment() {
        let owner = client();
        let mut posting = create_posting(&owner, draft()).unwrap();
        posting.status = PostingStatus::Assigned;
        posting.assigned_expert_id = Some(UserId::generate());

        close_posting(&mut posting, &owner, Some("scope changed".into())).unwrap();
        assert_eq!(posting.status, PostingStatus::Cancelled);
        assert!(posting.assigned_expert_id.is_none());
        assert!(posting.assignment_consistent());
    }

    #[test]
    fn close_fails_on_terminal() {
        let owner = client();
        let mut posting = create_posting(&owner, draft()).unwrap();
        close_posting(&mut posting, &owner, None).unwrap();
        assert!(matches!(
            close_posting(&mut posting, &owner, None),
            Err(CatalogError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn update_fails_once_assigned() {
        let owner = client();
        let mut posting = create_posting(&owner, draft()).unwrap();
        posting.status = PostingStatus::Assigned;
        posting.assigned_expert_id = Some(UserId::generate());
        assert!(matches!(
            update_posting(&mut posting, &owner, PostingUpdate::default()),
            Err(CatalogError::IllegalTransition { .. })
        ));
    }
}
