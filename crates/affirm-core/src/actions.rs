//! Mutations a user can trigger against the site.

use tracing::info;

use crate::api::AffirmationsClient;
use crate::error::ApiResult;
use crate::model::{ActionType, AffirmationDraft};
use crate::state::Feedback;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Save(i64),
    Unsave(i64),
    Pin(i64),
    Favorite(i64),
    Unpin(i64),
    SelectCategory { affirmation_id: i64, category_id: i64 },
    AddCategory(String),
    EditCategory { category_id: i64, name: String },
    DeleteCategory(i64),
    AddAffirmation(AffirmationDraft),
    EditAffirmation { affirmation_id: i64, draft: AffirmationDraft },
    DeleteAffirmation(i64),
}

impl Mutation {
    pub async fn run(&self, client: &AffirmationsClient) -> ApiResult<Option<String>> {
        info!(mutation = ?self, "sending");
        match self {
            Mutation::Save(id) => client.save(*id).await,
            Mutation::Unsave(id) => client.unsave(*id).await,
            Mutation::Pin(id) => client.pin(*id).await,
            Mutation::Favorite(id) => client.action(ActionType::Favorite, *id).await,
            Mutation::Unpin(id) => client.unpin(*id).await,
            Mutation::SelectCategory { affirmation_id, category_id } => {
                client.select_category(*affirmation_id, *category_id).await
            }
            Mutation::AddCategory(name) => client.add_category(name).await,
            Mutation::EditCategory { category_id, name } => client.edit_category(*category_id, name).await,
            Mutation::DeleteCategory(id) => client.delete_category(*id).await,
            Mutation::AddAffirmation(draft) => client.add_affirmation(draft).await,
            Mutation::EditAffirmation { affirmation_id, draft } => {
                client.edit_affirmation(*affirmation_id, draft).await
            }
            Mutation::DeleteAffirmation(id) => client.delete_affirmation(*id).await,
        }
    }

    /// Message shown on success when the server does not send one.
    pub fn done_message(&self) -> String {
        match self {
            Mutation::Save(_) => "Affirmation saved".to_string(),
            Mutation::Unsave(_) => "Affirmation unsaved".to_string(),
            Mutation::Pin(_) => "Affirmation pinned".to_string(),
            Mutation::Favorite(_) => "Affirmation added to favorites".to_string(),
            Mutation::Unpin(_) => "Affirmation unpinned".to_string(),
            Mutation::SelectCategory { .. } => "Category selected".to_string(),
            Mutation::AddCategory(name) => format!("Category \"{}\" added", name),
            Mutation::EditCategory { name, .. } => format!("Category renamed to \"{}\"", name),
            Mutation::DeleteCategory(_) => "Category deleted".to_string(),
            Mutation::AddAffirmation(_) => "Your affirmation has been added".to_string(),
            Mutation::EditAffirmation { .. } => "Affirmation updated".to_string(),
            Mutation::DeleteAffirmation(_) => "Affirmation deleted".to_string(),
        }
    }

    pub fn feedback(&self, reply: &ApiResult<Option<String>>) -> Feedback {
        Feedback::from_reply(reply, &self.done_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_feedback_prefers_server_message() {
        let pin = Mutation::Pin(3);
        assert_eq!(pin.feedback(&Ok(None)), Feedback::success("Affirmation pinned"));
        assert_eq!(
            pin.feedback(&Ok(Some("Affirmation pind successfully".to_string()))),
            Feedback::success("Affirmation pind successfully")
        );
        assert!(pin.feedback(&Err(ApiError::PinLimitReached)).is_blocking());
    }

    #[test]
    fn test_done_message_names_category() {
        let add = Mutation::AddCategory("Gratitude".to_string());
        assert_eq!(add.done_message(), "Category \"Gratitude\" added");
    }
}
